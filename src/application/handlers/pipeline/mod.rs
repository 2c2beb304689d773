//! Pipeline handlers: pre-screening alone, or the full analysis run.

mod analyze_case;
mod case_source;
mod prescreen_case;

pub use analyze_case::{AnalysisOutcome, AnalyzeCaseHandler, PipelineEvent, RunHandle, DEFAULT_EVENT_CAPACITY};
pub use case_source::{CaseSource, PipelineError};
pub use prescreen_case::PrescreenCaseHandler;
