//! Error types for the reasoning orchestrator

use std::time::Duration;

use super::agent::{AgentKind, ReasoningStep};
use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};
use crate::domain::transparency::TransparencyLog;

/// A reasoning agent did not produce output.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum AgentError {
    #[error("{agent} agent failed: {message}")]
    Failed { agent: AgentKind, message: String },

    #[error("{agent} agent timed out after {}ms", .after.as_millis())]
    TimedOut { agent: AgentKind, after: Duration },

    #[error("Run cancelled during {agent} agent")]
    Cancelled { agent: AgentKind },
}

impl AgentError {
    pub fn agent(&self) -> AgentKind {
        match self {
            AgentError::Failed { agent, .. }
            | AgentError::TimedOut { agent, .. }
            | AgentError::Cancelled { agent } => *agent,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, AgentError::Cancelled { .. })
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ReasoningError {
    #[error("Invalid case: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Agent(#[from] AgentError),
}

impl From<&ReasoningError> for DomainError {
    fn from(err: &ReasoningError) -> Self {
        let code = match err {
            ReasoningError::Validation(_) => ErrorCode::ValidationFailed,
            ReasoningError::Agent(AgentError::Failed { .. }) => ErrorCode::AgentFailed,
            ReasoningError::Agent(AgentError::TimedOut { .. }) => ErrorCode::AgentTimedOut,
            ReasoningError::Agent(AgentError::Cancelled { .. }) => ErrorCode::RunCancelled,
        };
        DomainError::new(code, err.to_string())
    }
}

/// An aborted run: the error plus the steps delivered before it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReasoningFailure {
    pub error: ReasoningError,
    pub partial: Vec<ReasoningStep>,
    pub log: TransparencyLog,
}

impl ReasoningFailure {
    pub fn agent_error(&self) -> Option<&AgentError> {
        match &self.error {
            ReasoningError::Agent(err) => Some(err),
            ReasoningError::Validation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_error_timed_out_display() {
        let err = AgentError::TimedOut {
            agent: AgentKind::RiskAssessment,
            after: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "RiskAssessment agent timed out after 1500ms");
    }

    #[test]
    fn test_agent_error_cancelled_display() {
        let err = AgentError::Cancelled {
            agent: AgentKind::SopMatch,
        };
        assert_eq!(err.to_string(), "Run cancelled during SOPMatch agent");
        assert!(err.is_cancelled());
        assert_eq!(err.agent(), AgentKind::SopMatch);
    }

    #[test]
    fn test_reasoning_error_maps_to_domain_codes() {
        let err = ReasoningError::Agent(AgentError::Failed {
            agent: AgentKind::Analysis,
            message: "provider unavailable: down".to_string(),
        });
        let domain: DomainError = (&err).into();
        assert_eq!(domain.code, ErrorCode::AgentFailed);
        assert_eq!(domain.message, "Analysis agent failed: provider unavailable: down");
    }
}
