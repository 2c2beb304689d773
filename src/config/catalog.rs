//! SOP catalog configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::{ConfigError, ValidationError};
use crate::adapters::catalog::InMemorySopCatalog;

/// Where SOP scenarios come from
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    /// YAML catalog file; the built-in catalog is used when unset
    pub path: Option<PathBuf>,
}

impl CatalogConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.path {
            Some(path) if path.as_os_str().is_empty() => Err(ValidationError::EmptyCatalogPath),
            _ => Ok(()),
        }
    }

    pub fn load(&self) -> Result<InMemorySopCatalog, ConfigError> {
        let catalog = match &self.path {
            Some(path) => {
                tracing::info!("Loading SOP catalog from {}", path.display());
                InMemorySopCatalog::from_path(path)?
            }
            None => InMemorySopCatalog::builtin()?,
        };
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_without_path() {
        let catalog = CatalogConfig::default().load().unwrap();
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let config = CatalogConfig {
            path: Some(PathBuf::from("/nonexistent/catalog.yaml")),
        };
        assert!(matches!(config.load(), Err(ConfigError::Catalog(_))));
    }

    #[test]
    fn test_empty_path_fails_validation() {
        let config = CatalogConfig {
            path: Some(PathBuf::new()),
        };
        assert_eq!(config.validate(), Err(ValidationError::EmptyCatalogPath));
    }
}
