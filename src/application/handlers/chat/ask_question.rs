//! AskQuestionHandler - chat follow-up about a case and its reasoning trace.

use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::application::handlers::pipeline::{CaseSource, PipelineError};
use crate::domain::chat::{ChatAssistant, ChatContext, ChatFailure, ChatMessage};
use crate::domain::reasoning::ReasoningStep;
use crate::ports::CaseStore;

#[derive(Debug, Clone)]
pub struct AskQuestionCommand {
    pub message: String,
    /// Case the question is about, if any.
    pub case: Option<CaseSource>,
    pub history: Vec<ChatMessage>,
    /// Reasoning steps emitted so far for the case.
    pub steps: Vec<ReasoningStep>,
}

impl AskQuestionCommand {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            case: None,
            history: Vec::new(),
            steps: Vec::new(),
        }
    }

    pub fn about(mut self, case: impl Into<CaseSource>) -> Self {
        self.case = Some(case.into());
        self
    }

    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }

    pub fn with_steps(mut self, steps: Vec<ReasoningStep>) -> Self {
        self.steps = steps;
        self
    }
}

/// Streamed chat output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    Token { delta: String },
    Complete { message: ChatMessage },
    /// The apology to show, and the underlying error for the caller.
    Failed { message: ChatMessage, error: String },
}

/// Chat events for one question. Dropping it stops the provider call.
pub struct ChatStream {
    events: mpsc::UnboundedReceiver<ChatEvent>,
    task: JoinHandle<()>,
}

impl ChatStream {
    pub async fn next_event(&mut self) -> Option<ChatEvent> {
        self.events.recv().await
    }
}

impl Stream for ChatStream {
    type Item = ChatEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().events.poll_recv(cx)
    }
}

impl Drop for ChatStream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub struct AskQuestionHandler {
    store: Arc<dyn CaseStore>,
    assistant: Arc<ChatAssistant>,
}

impl AskQuestionHandler {
    pub fn new(store: Arc<dyn CaseStore>, assistant: Arc<ChatAssistant>) -> Self {
        Self { store, assistant }
    }

    async fn context(&self, cmd: &AskQuestionCommand) -> Result<ChatContext, PipelineError> {
        let mut ctx = ChatContext::new()
            .with_steps(cmd.steps.clone())
            .with_history(cmd.history.clone());
        if let Some(source) = cmd.case.clone() {
            ctx.case = Some(source.resolve(self.store.as_ref()).await?);
        }
        Ok(ctx)
    }

    /// Answers in one piece. The outer error means the case could not be
    /// loaded; the inner one carries the apology.
    pub async fn handle(&self, cmd: AskQuestionCommand) -> Result<Result<ChatMessage, ChatFailure>, PipelineError> {
        let ctx = self.context(&cmd).await?;
        Ok(self.assistant.ask(&cmd.message, &ctx).await)
    }

    /// Answers token by token.
    pub async fn stream(&self, cmd: AskQuestionCommand) -> Result<ChatStream, PipelineError> {
        let ctx = self.context(&cmd).await?;
        let (tx, events) = mpsc::unbounded_channel();
        let assistant = self.assistant.clone();

        let task = tokio::spawn(async move {
            let token_tx = tx.clone();
            let result = assistant
                .ask_streaming(&cmd.message, &ctx, move |delta| {
                    let _ = token_tx.send(ChatEvent::Token {
                        delta: delta.to_string(),
                    });
                })
                .await;
            let last = match result {
                Ok(message) => ChatEvent::Complete { message },
                Err(failure) => ChatEvent::Failed {
                    message: failure.apology,
                    error: failure.error.to_string(),
                },
            };
            let _ = tx.send(last);
        });

        Ok(ChatStream { events, task })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::adapters::case_store::InMemoryCaseStore;
    use crate::domain::foundation::CaseId;

    fn handler(provider: MockAIProvider) -> (AskQuestionHandler, Arc<MockAIProvider>) {
        let provider = Arc::new(provider);
        let handler = AskQuestionHandler::new(
            Arc::new(InMemoryCaseStore::seeded().unwrap()),
            Arc::new(ChatAssistant::new(provider.clone())),
        );
        (handler, provider)
    }

    #[tokio::test]
    async fn streams_tokens_then_complete() {
        let (handler, provider) = handler(MockAIProvider::new().with_response("See SOP 3.1 first"));
        let cmd = AskQuestionCommand::new("What applies?").about(CaseId::new("CLM-1001").unwrap());

        let mut stream = handler.stream(cmd).await.unwrap();
        let mut text = String::new();
        let mut complete = None;
        while let Some(event) = stream.next_event().await {
            match event {
                ChatEvent::Token { delta } => text.push_str(&delta),
                ChatEvent::Complete { message } => complete = Some(message),
                ChatEvent::Failed { error, .. } => panic!("unexpected failure: {}", error),
            }
        }

        assert_eq!(text, "See SOP 3.1 first");
        assert_eq!(complete.unwrap().sop_references.len(), 1);
        let system = provider.get_calls()[0].system_prompt.clone().unwrap_or_default();
        assert!(system.contains("CLM-1001"));
    }

    #[tokio::test]
    async fn provider_failure_streams_apology() {
        let (handler, _) = handler(MockAIProvider::new().with_error(MockError::AuthenticationFailed));

        let mut stream = handler.stream(AskQuestionCommand::new("Hello")).await.unwrap();

        match stream.next_event().await {
            Some(ChatEvent::Failed { message, error }) => {
                assert!(message.text.starts_with("I apologize"));
                assert_eq!(error, "authentication failed");
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unknown_case_is_rejected_up_front() {
        let (handler, provider) = handler(MockAIProvider::new());
        let cmd = AskQuestionCommand::new("Why?").about(CaseId::new("CLM-404").unwrap());

        assert!(handler.handle(cmd).await.is_err());
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn handle_returns_whole_answer() {
        let (handler, _) = handler(MockAIProvider::new().with_response("Page 9 covers it."));

        let reply = handler.handle(AskQuestionCommand::new("Where?")).await.unwrap().unwrap();

        assert_eq!(reply.text, "Page 9 covers it.");
    }
}
