//! Application layer - handlers that drive the reasoning engine.
//!
//! Handlers resolve cases through the [`CaseStore`](crate::ports::CaseStore)
//! port and coordinate the domain services. They know nothing about HTTP.

pub mod handlers;

pub use handlers::{
    // Pipeline
    AnalysisOutcome, AnalyzeCaseHandler, CaseSource, PipelineError, PipelineEvent,
    PrescreenCaseHandler, RunHandle, DEFAULT_EVENT_CAPACITY,
    // Chat
    AskQuestionCommand, AskQuestionHandler, ChatEvent, ChatStream,
};
