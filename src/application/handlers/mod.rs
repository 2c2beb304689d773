//! Application handlers.

pub mod chat;
pub mod pipeline;

pub use chat::{AskQuestionCommand, AskQuestionHandler, ChatEvent, ChatStream};
pub use pipeline::{
    AnalysisOutcome, AnalyzeCaseHandler, CaseSource, PipelineError, PipelineEvent,
    PrescreenCaseHandler, RunHandle, DEFAULT_EVENT_CAPACITY,
};
