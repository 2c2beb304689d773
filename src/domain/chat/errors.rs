//! Error types for the chat assistant

use super::message::ChatMessage;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::AIError;

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ChatError {
    #[error("Message is required")]
    EmptyQuestion,

    #[error("{0}")]
    Provider(#[from] AIError),
}

impl From<&ChatError> for DomainError {
    fn from(err: &ChatError) -> Self {
        let code = match err {
            ChatError::EmptyQuestion => ErrorCode::ValidationFailed,
            ChatError::Provider(AIError::RateLimited { .. }) => ErrorCode::RateLimited,
            ChatError::Provider(_) => ErrorCode::ChatFailed,
        };
        DomainError::new(code, err.to_string())
    }
}

/// A failed question: the apology to show and the error behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatFailure {
    pub apology: ChatMessage,
    pub error: ChatError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_display() {
        assert_eq!(ChatError::EmptyQuestion.to_string(), "Message is required");
        let err = ChatError::Provider(AIError::network("connection reset"));
        assert_eq!(err.to_string(), "network error: connection reset");
    }

    #[test]
    fn test_rate_limit_maps_to_rate_limited_code() {
        let err = ChatError::Provider(AIError::rate_limited(10));
        let domain: DomainError = (&err).into();
        assert_eq!(domain.code, ErrorCode::RateLimited);
    }
}
