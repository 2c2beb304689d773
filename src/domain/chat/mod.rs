//! Chat follow-up over a case and its reasoning trace.

mod assistant;
mod errors;
mod message;
mod sop_refs;

pub use assistant::{ChatAssistant, ChatConfig, DEFAULT_SUGGESTIONS, FAILURE_SUGGESTIONS};
pub use errors::{ChatError, ChatFailure};
pub use message::{ChatContext, ChatMessage, ChatRole, SopReference};
pub use sop_refs::extract_sop_references;
