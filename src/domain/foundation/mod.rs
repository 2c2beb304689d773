//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types that form the
//! vocabulary shared by pre-screening, reasoning, chat and reconciliation.

mod confidence;
mod errors;
mod ids;
mod timestamp;

pub mod millis;

pub use confidence::Confidence;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{CaseId, RunId};
pub use timestamp::Timestamp;
