//! Mock AI Provider for testing.
//!
//! Provides a configurable mock implementation of the AIProvider port,
//! allowing tests and offline runs to work without calling real AI APIs.
//!
//! # Features
//!
//! - Pre-configured responses, consumed in order
//! - Simulated delays for timeout testing
//! - Error injection for resilience testing
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_response("ACTION: APPROVE\nAll criteria met.")
//!     .with_delay(Duration::from_millis(100));
//!
//! let response = provider.complete(request).await?;
//! ```

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, CompletionStream, FinishReason,
    ProviderInfo, StreamChunk, TokenUsage,
};

const DEFAULT_CONTENT: &str = "Mock response";

const DEMO_RESPONSES: [(&str, &str); 5] = [
    (
        "Analysis",
        "The case record is complete enough to assess. Member and provider are identified, \
the billed amount is consistent with the line items, and the attributes on file point to a \
specific review scenario.",
    ),
    (
        "SOPMatch",
        "The scenario SOP is the primary procedure for this case. The status SOP governs queue \
handling while the review is open.",
    ),
    (
        "RiskAssessment",
        "Moderate risk. Missing documentation or eligibility gaps would expose the payer to an \
incorrect payment; no indicators of fraud are present.",
    ),
    (
        "Recommendation",
        "ACTION: REVIEW\nRoute the case to a reviewer to confirm documentation against the matched \
SOP before a final decision.",
    ),
    (
        "chat",
        "Based on the reasoning trace, the matched SOP applies. Confirm the documentation listed in \
the SOP steps, then record the decision with any applicable denial code.",
    ),
];

/// Mock AI provider for testing.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Returned when the queue is empty, keyed by request purpose.
    by_purpose: Arc<HashMap<String, String>>,
    /// Returned when the queue is empty and no purpose matches.
    fallback: String,
    info: ProviderInfo,
    /// Simulated latency per request.
    delay: Duration,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success {
        content: String,
        usage: TokenUsage,
        finish_reason: FinishReason,
    },
    Error(MockError),
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    RateLimited { retry_after_secs: u32 },
    ContentFiltered { reason: String },
    Unavailable { message: String },
    AuthenticationFailed,
    Network { message: String },
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::ContentFiltered { reason } => AIError::content_filtered(reason),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
        }
    }
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAIProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            by_purpose: Arc::new(HashMap::new()),
            fallback: DEFAULT_CONTENT.to_string(),
            info: ProviderInfo::new("mock", "mock-model-1").with_streaming(true),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a successful response to the queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.with_response_full(content, TokenUsage::new(10, 20), FinishReason::Stop)
    }

    /// Adds a successful response with full configuration.
    pub fn with_response_full(
        self,
        content: impl Into<String>,
        usage: TokenUsage,
        finish_reason: FinishReason,
    ) -> Self {
        self.push(MockResponse::Success {
            content: content.into(),
            usage,
            finish_reason,
        });
        self
    }

    /// Adds an error response to the queue.
    pub fn with_error(self, error: MockError) -> Self {
        self.push(MockResponse::Error(error));
        self
    }

    /// Canned content for requests with the given purpose, used once the
    /// queue is exhausted.
    pub fn with_purpose_response(mut self, purpose: impl Into<String>, content: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.by_purpose).insert(purpose.into(), content.into());
        self
    }

    /// Offline provider with a canned answer for each reasoning agent and
    /// for chat.
    pub fn demo() -> Self {
        DEMO_RESPONSES
            .iter()
            .fold(Self::new(), |provider, (purpose, content)| {
                provider.with_purpose_response(*purpose, *content)
            })
            .with_provider_info(ProviderInfo::new("mock", "demo").with_streaming(true))
    }

    /// Content returned once the queue is exhausted.
    pub fn with_fallback(mut self, content: impl Into<String>) -> Self {
        self.fallback = content.into();
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_provider_info(mut self, info: ProviderInfo) -> Self {
        self.info = info;
        self
    }

    pub fn call_count(&self) -> usize {
        self.lock_calls().len()
    }

    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        self.lock_calls().clone()
    }

    pub fn clear_calls(&self) {
        self.lock_calls().clear();
    }

    fn push(&self, response: MockResponse) {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(response);
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<CompletionRequest>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records the call, waits out the delay, and pops the next response.
    async fn next_response(&self, request: CompletionRequest) -> MockResponse {
        let purpose = request.metadata.purpose.clone();
        self.lock_calls().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let next = self
            .responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();
        next.unwrap_or_else(|| MockResponse::Success {
            content: self
                .by_purpose
                .get(&purpose)
                .unwrap_or(&self.fallback)
                .clone(),
            usage: TokenUsage::new(5, 10),
            finish_reason: FinishReason::Stop,
        })
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        match self.next_response(request).await {
            MockResponse::Success {
                content,
                usage,
                finish_reason,
            } => Ok(CompletionResponse {
                content,
                usage,
                model: self.info.model.clone(),
                finish_reason,
            }),
            MockResponse::Error(err) => Err(err.into()),
        }
    }

    async fn stream_complete(&self, request: CompletionRequest) -> Result<CompletionStream, AIError> {
        match self.next_response(request).await {
            MockResponse::Success {
                content,
                finish_reason,
                ..
            } => {
                // Word-sized chunks that concatenate back to the exact content
                let chunks: Vec<Result<StreamChunk, AIError>> = content
                    .split_inclusive(' ')
                    .map(|s| Ok(StreamChunk::content(s)))
                    .collect();
                let done = stream::once(async move { Ok(StreamChunk::final_chunk(finish_reason)) });
                Ok(Box::pin(stream::iter(chunks).chain(done)))
            }
            MockResponse::Error(err) => Err(err.into()),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}
