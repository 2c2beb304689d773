//! Pre-screening: ordered compliance checks over a case, ending in a
//! rule-based recommendation and a transparency log.

mod check;
pub mod checks;
mod engine;
mod errors;
mod policy;
mod step;

pub use check::{CheckContext, CheckFn, CheckOutcome, CheckSpec, Finding, ScenarioDefinition, Severity};
pub use engine::{PreScreeningEngine, ScreeningResult};
pub use errors::{CheckExecutionError, ScreeningError};
pub use policy::ScreeningPolicy;
pub use step::{PartialResult, StepResult, StepStatus};
