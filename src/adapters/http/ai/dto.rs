//! Request bodies and stream frames for AI endpoints.

use serde::{Deserialize, Serialize};

use crate::adapters::http::error::ApiError;
use crate::application::{AnalysisOutcome, CaseSource};
use crate::domain::case::Case;
use crate::domain::chat::{ChatMessage, ChatRole, SopReference};
use crate::domain::foundation::{CaseId, DomainError};
use crate::domain::reasoning::ReasoningStep;
use crate::domain::recommendation::Recommendation;
use crate::domain::reconciliation::Reconciliation;
use crate::domain::screening::ScreeningResult;

// ════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════

/// Either a stored case id or the case itself. The id wins when both are set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRef {
    #[serde(default)]
    pub case_id: Option<String>,
    #[serde(default)]
    pub case: Option<Case>,
}

impl CaseRef {
    pub fn is_empty(&self) -> bool {
        self.case_id.as_deref().map_or(true, |s| s.trim().is_empty()) && self.case.is_none()
    }

    pub fn into_source(self) -> Result<Option<CaseSource>, ApiError> {
        if let Some(id) = self.case_id.filter(|s| !s.trim().is_empty()) {
            let id = CaseId::new(id).map_err(|e| ApiError(DomainError::from(e)))?;
            return Ok(Some(CaseSource::Stored(id)));
        }
        Ok(self.case.map(CaseSource::from))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(flatten)]
    pub case: CaseRef,
}

/// One prior turn as the client sends it.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEntry {
    pub role: ChatRole,
    #[serde(alias = "text")]
    pub content: String,
}

impl From<HistoryEntry> for ChatMessage {
    fn from(entry: HistoryEntry) -> Self {
        match entry.role {
            ChatRole::User => ChatMessage::user(entry.content),
            ChatRole::Assistant => ChatMessage::assistant(entry.content),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(flatten)]
    pub case: CaseRef,
    #[serde(default)]
    pub conversation_history: Vec<HistoryEntry>,
    #[serde(default)]
    pub reasoning_steps: Vec<ReasoningStep>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileRequest {
    pub rule_based: Recommendation,
    pub ai: Recommendation,
}

// ════════════════════════════════════════════════════════════════════════════
// Stream frames
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResultDto {
    pub run_id: String,
    pub steps: Vec<ReasoningStep>,
    pub recommendation: Recommendation,
    pub pre_screening: ScreeningResult,
    pub agreement: Reconciliation,
}

impl From<AnalysisOutcome> for AnalysisResultDto {
    fn from(outcome: AnalysisOutcome) -> Self {
        Self {
            run_id: outcome.run_id.to_string(),
            steps: outcome.steps,
            recommendation: outcome.recommendation,
            pre_screening: outcome.pre_screening,
            agreement: outcome.agreement,
        }
    }
}

/// Frames of `POST /ai/analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalyzeFrame {
    Step { step: ReasoningStep },
    Complete { result: Box<AnalysisResultDto> },
    Error { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResultDto {
    pub response: String,
    pub sop_references: Vec<SopReference>,
    pub suggestions: Vec<String>,
}

impl From<ChatMessage> for ChatResultDto {
    fn from(message: ChatMessage) -> Self {
        Self {
            response: message.text,
            sop_references: message.sop_references,
            suggestions: message.suggestions,
        }
    }
}

/// Frames of `POST /ai/chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatFrame {
    Token {
        token: String,
    },
    Complete {
        result: ChatResultDto,
    },
    /// `fallback` holds the apology to show in place of an answer.
    Error {
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fallback: Option<ChatResultDto>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn case_id_takes_precedence_over_inline_case() {
        let req: AnalyzeRequest = serde_json::from_value(json!({
            "caseId": "CLM-1001",
            "case": { "id": "CLM-9", "status": "Pending Review" }
        }))
        .unwrap();
        match req.case.into_source().unwrap() {
            Some(CaseSource::Stored(id)) => assert_eq!(id.as_str(), "CLM-1001"),
            other => panic!("expected stored case, got {:?}", other),
        }
    }

    #[test]
    fn missing_case_reference_is_empty() {
        let req: AnalyzeRequest = serde_json::from_value(json!({ "caseId": "  " })).unwrap();
        assert!(req.case.is_empty());
    }

    #[test]
    fn chat_request_accepts_history_and_steps() {
        let req: ChatRequest = serde_json::from_value(json!({
            "message": "Why deny?",
            "caseId": "CLM-1001",
            "conversationHistory": [
                { "role": "user", "content": "Hi" },
                { "role": "assistant", "text": "Hello" }
            ]
        }))
        .unwrap();
        let history: Vec<ChatMessage> = req.conversation_history.into_iter().map(Into::into).collect();
        assert_eq!(history[0].role, ChatRole::User);
        assert_eq!(history[1].text, "Hello");
        assert!(req.reasoning_steps.is_empty());
    }

    #[test]
    fn chat_frames_use_type_discriminator() {
        let token = serde_json::to_value(ChatFrame::Token { token: "Hi".into() }).unwrap();
        assert_eq!(token, json!({ "type": "token", "token": "Hi" }));

        let complete = serde_json::to_value(ChatFrame::Complete {
            result: ChatResultDto {
                response: "See Page 9".into(),
                sop_references: vec![SopReference::Page { page: "Page 9".into() }],
                suggestions: vec![],
            },
        })
        .unwrap();
        assert_eq!(complete["result"]["sopReferences"], json!([{ "page": "Page 9" }]));
    }
}
