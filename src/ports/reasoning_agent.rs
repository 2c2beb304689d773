//! Reasoning Agent Port - one unit of work in the reasoning trace.

use async_trait::async_trait;

use super::AIError;
use crate::domain::reasoning::{AgentInput, AgentKind, AgentOutput};

/// A single agent of the reasoning trace.
///
/// An agent call may be slow; the orchestrator bounds it with the run's
/// timeout and drops the future on cancellation, so implementations must
/// not rely on running to completion.
#[async_trait]
pub trait ReasoningAgent: Send + Sync {
    /// Slot this agent fills.
    fn kind(&self) -> AgentKind;

    /// Name shown in the transparency log.
    fn api_name(&self) -> String {
        format!("{} Agent", self.kind())
    }

    async fn run(&self, input: &AgentInput) -> Result<AgentOutput, AIError>;
}
