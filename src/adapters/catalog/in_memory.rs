//! In-memory SOP catalog loaded from YAML.
//!
//! Lookups are case-insensitive on trimmed keys. The catalog is immutable
//! after loading and shared across runs behind an `Arc`.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::screening::checks::{checks_for, generic_checks};
use crate::domain::screening::ScenarioDefinition;
use crate::domain::sop::SopDocument;
use crate::ports::SopCatalog;

const BUILTIN_CATALOG: &str = include_str!("claims_catalog.yaml");

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("duplicate {kind} '{key}' in catalog")]
    Duplicate { kind: &'static str, key: String },
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    statuses: Vec<StatusEntry>,
    #[serde(default)]
    scenarios: Vec<ScenarioEntry>,
}

#[derive(Debug, Deserialize)]
struct StatusEntry {
    status: String,
    sop: SopDocument,
}

#[derive(Debug, Deserialize)]
struct ScenarioEntry {
    key: String,
    sop: SopDocument,
}

/// Read-only catalog of status and scenario definitions.
#[derive(Debug, Default)]
pub struct InMemorySopCatalog {
    statuses: HashMap<String, Arc<ScenarioDefinition>>,
    scenarios: HashMap<String, Arc<ScenarioDefinition>>,
    /// Catalog order, statuses first.
    ordered: Vec<Arc<ScenarioDefinition>>,
}

impl InMemorySopCatalog {
    /// The catalog compiled into the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_yaml_str(BUILTIN_CATALOG)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(raw)?;
        let mut catalog = Self::default();

        for entry in file.statuses {
            let definition = ScenarioDefinition::new(entry.status.trim(), entry.sop, generic_checks());
            catalog.insert_status(definition)?;
        }

        for entry in file.scenarios {
            let key = entry.key.trim().to_string();
            let checks = checks_for(&key, &entry.sop).unwrap_or_else(|| {
                tracing::debug!(scenario = %key, "No dedicated checks; using generic sequence");
                generic_checks()
            });
            catalog.insert_scenario(ScenarioDefinition::new(key, entry.sop, checks))?;
        }

        tracing::info!(
            statuses = catalog.statuses.len(),
            scenarios = catalog.scenarios.len(),
            "SOP catalog loaded"
        );
        Ok(catalog)
    }

    fn insert_status(&mut self, definition: ScenarioDefinition) -> Result<(), CatalogError> {
        let key = normalize(&definition.key);
        if self.statuses.contains_key(&key) {
            return Err(CatalogError::Duplicate {
                kind: "status",
                key: definition.key,
            });
        }
        let definition = Arc::new(definition);
        self.statuses.insert(key, definition.clone());
        self.ordered.push(definition);
        Ok(())
    }

    fn insert_scenario(&mut self, definition: ScenarioDefinition) -> Result<(), CatalogError> {
        let key = normalize(&definition.key);
        if self.scenarios.contains_key(&key) {
            return Err(CatalogError::Duplicate {
                kind: "scenario",
                key: definition.key,
            });
        }
        let definition = Arc::new(definition);
        self.scenarios.insert(key, definition.clone());
        self.ordered.push(definition);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

fn normalize(key: &str) -> String {
    key.trim().to_lowercase()
}

impl SopCatalog for InMemorySopCatalog {
    fn resolve_by_scenario(&self, key: &str) -> Option<Arc<ScenarioDefinition>> {
        self.scenarios.get(&normalize(key)).cloned()
    }

    fn resolve_by_status(&self, status: &str) -> Option<Arc<ScenarioDefinition>> {
        self.statuses.get(&normalize(status)).cloned()
    }

    fn all(&self) -> Vec<Arc<ScenarioDefinition>> {
        self.ordered.clone()
    }
}
