//! Multi-agent reasoning over a case.

mod agent;
mod errors;
mod orchestrator;
mod run_context;

pub use agent::{AgentInput, AgentKind, AgentOutput, CandidateSop, ReasoningStep};
pub use errors::{AgentError, ReasoningError, ReasoningFailure};
pub use orchestrator::{AgentRoster, ReasoningEvent, ReasoningOrchestrator, ReasoningResult};
pub use run_context::{CancelHandle, RunConfig, RunContext};
