//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Catalog loading failed: {0}")]
    Catalog(#[from] crate::adapters::catalog::CatalogError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout: must be between 1 and 300 seconds")]
    InvalidTimeout,

    #[error("Invalid SSE keep-alive interval: must be positive")]
    InvalidKeepAlive,

    #[error("Invalid log filter: {0}")]
    InvalidLogFilter(String),

    #[error("Invalid AI temperature: must be between 0 and 2")]
    InvalidTemperature,

    #[error("Invalid max tokens: must be positive")]
    InvalidMaxTokens,

    #[error("Invalid {field}: must be between 0 and 1")]
    ConfidenceOutOfRange { field: &'static str },

    #[error("Review confidence must not exceed deny or approve confidence")]
    ReviewAboveDecision,

    #[error("High value threshold must be a non-negative number")]
    InvalidThreshold,

    #[error("Catalog path is empty")]
    EmptyCatalogPath,

    #[error("{}", join(.0))]
    Multiple(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// Folds collected violations into one error, or none.
    pub fn collect(mut errors: Vec<ValidationError>) -> Result<(), ValidationError> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ValidationError::Multiple(errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_keeps_single_error_unwrapped() {
        assert_eq!(
            ValidationError::collect(vec![ValidationError::InvalidPort]),
            Err(ValidationError::InvalidPort)
        );
        assert_eq!(ValidationError::collect(vec![]), Ok(()));
    }

    #[test]
    fn multiple_errors_display_joined() {
        let err = ValidationError::Multiple(vec![
            ValidationError::InvalidPort,
            ValidationError::InvalidTimeout,
        ]);
        assert_eq!(
            err.to_string(),
            "Invalid port number; Invalid request timeout: must be between 1 and 300 seconds"
        );
    }
}
