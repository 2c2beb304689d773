//! Error types for pre-screening

use crate::domain::foundation::ValidationError;

/// Errors that stop a pre-screening run before its first check.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ScreeningError {
    #[error("Invalid case: {0}")]
    Validation(#[from] ValidationError),
}

/// A single check could not be evaluated. `check` is the check's title.
///
/// Never escapes the engine: it is recorded as an error step.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum CheckExecutionError {
    #[error("Check '{check}' failed: {message}")]
    Failed { check: String, message: String },

    #[error("Check '{check}' panicked: {message}")]
    Panicked { check: String, message: String },
}

impl CheckExecutionError {
    pub fn failed(check: impl Into<String>, message: impl Into<String>) -> Self {
        CheckExecutionError::Failed {
            check: check.into(),
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CheckExecutionError::Failed { message, .. }
            | CheckExecutionError::Panicked { message, .. } => message,
        }
    }
}
