//! ChatAssistant - follow-up questions answered against the reasoning trace.
//!
//! Stateless: everything the assistant knows arrives in the `ChatContext`.
//! Failures come back as a `ChatFailure` whose apology message is ready to
//! show, with the underlying error kept for the caller to log.

use futures::StreamExt;
use std::sync::Arc;

use super::errors::{ChatError, ChatFailure};
use super::message::{ChatContext, ChatMessage, ChatRole};
use super::sop_refs::extract_sop_references;
use crate::ports::{AIProvider, CompletionRequest, Message, RequestMetadata};

pub const DEFAULT_SUGGESTIONS: [&str; 3] = [
    "What SOPs apply to this case?",
    "Explain the recommendation in more detail",
    "What are the next steps?",
];

pub const FAILURE_SUGGESTIONS: [&str; 2] = ["Try asking again", "Check API configuration"];

const SYSTEM_PROMPT: &str = "You are an expert case review assistant. Help reviewers understand \
the case, the Standard Operating Procedures (SOPs) that apply to it, and the AI reasoning and \
recommendation produced for it.

Key capabilities:
- Explain case details and status
- Reference relevant SOPs and procedures by number or page
- Interpret reasoning steps and recommendations
- Provide guidance on next steps

Answer only from the context provided. Be accurate and cite SOPs when relevant.";

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub max_tokens: u32,
    pub temperature: f32,
    /// Most recent history messages sent to the model.
    pub history_limit: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_tokens: 1000,
            temperature: 0.7,
            history_limit: 20,
        }
    }
}

pub struct ChatAssistant {
    provider: Arc<dyn AIProvider>,
    config: ChatConfig,
}

impl ChatAssistant {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self {
            provider,
            config: ChatConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ChatConfig) -> Self {
        self.config = config;
        self
    }

    /// Answers a question in one completion call.
    pub async fn ask(&self, question: &str, ctx: &ChatContext) -> Result<ChatMessage, ChatFailure> {
        let request = self.build_request(question, ctx).map_err(|e| self.failure(e))?;
        match self.provider.complete(request).await {
            Ok(response) => Ok(self.answer(response.content)),
            Err(e) => Err(self.failure(e.into())),
        }
    }

    /// Answers a question, passing each text fragment to `on_token` as the
    /// provider streams it.
    pub async fn ask_streaming<F>(
        &self,
        question: &str,
        ctx: &ChatContext,
        mut on_token: F,
    ) -> Result<ChatMessage, ChatFailure>
    where
        F: FnMut(&str) + Send,
    {
        let request = self.build_request(question, ctx).map_err(|e| self.failure(e))?;
        let mut stream = self
            .provider
            .stream_complete(request)
            .await
            .map_err(|e| self.failure(e.into()))?;

        let mut text = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| self.failure(e.into()))?;
            if !chunk.delta.is_empty() {
                on_token(&chunk.delta);
                text.push_str(&chunk.delta);
            }
            if chunk.is_final() {
                break;
            }
        }
        Ok(self.answer(text))
    }

    fn build_request(&self, question: &str, ctx: &ChatContext) -> Result<CompletionRequest, ChatError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ChatError::EmptyQuestion);
        }

        let mut metadata = RequestMetadata::new("chat");
        if let Some(case) = &ctx.case {
            metadata = metadata.for_case(case.id.clone());
        }

        let skip = ctx.history.len().saturating_sub(self.config.history_limit);
        let history = ctx.history.iter().skip(skip).map(|m| match m.role {
            ChatRole::User => Message::user(m.text.clone()),
            ChatRole::Assistant => Message::assistant(m.text.clone()),
        });

        Ok(CompletionRequest::new(metadata)
            .with_system_prompt(system_prompt(ctx))
            .with_messages(history)
            .with_message(crate::ports::MessageRole::User, question)
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(self.config.temperature))
    }

    fn answer(&self, text: String) -> ChatMessage {
        let refs = extract_sop_references(&text);
        ChatMessage::assistant(text)
            .with_sop_references(refs)
            .with_suggestions(DEFAULT_SUGGESTIONS.iter().map(|s| s.to_string()).collect())
    }

    fn failure(&self, error: ChatError) -> ChatFailure {
        tracing::warn!("Chat request failed: {}", error);
        let apology = ChatMessage::assistant(format!(
            "I apologize, but I encountered an error: {}. Please try again or check your API configuration.",
            error
        ))
        .with_suggestions(FAILURE_SUGGESTIONS.iter().map(|s| s.to_string()).collect());
        ChatFailure { apology, error }
    }
}

/// System prompt with the case and the reasoning trace folded in.
fn system_prompt(ctx: &ChatContext) -> String {
    let mut prompt = SYSTEM_PROMPT.to_string();
    if let Some(case) = &ctx.case {
        prompt.push_str("\n\nCurrent Case Context:\n");
        prompt.push_str(&case.summary());
    }
    if !ctx.steps.is_empty() {
        prompt.push_str("\n\nAI Reasoning Summary:");
        for step in &ctx.steps {
            prompt.push_str(&format!(
                "\n{}. [{}] {} (confidence {})",
                step.step, step.agent, step.text, step.confidence
            ));
            if !step.sop_refs.is_empty() {
                prompt.push_str(&format!(" SOPs: {}", step.sop_refs.join(", ")));
            }
        }
    }
    prompt
}
