use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::case::Case;
use crate::domain::foundation::Timestamp;
use crate::domain::reasoning::ReasoningStep;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// An SOP cited in an answer: a page of the SOP manual or a section title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SopReference {
    Page { page: String },
    Title { title: String },
}

impl fmt::Display for SopReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SopReference::Page { page } => f.write_str(page),
            SopReference::Title { title } => f.write_str(title),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: ChatRole,
    #[serde(alias = "content")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sop_references: Vec<SopReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub timestamp: Timestamp,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
            sop_references: Vec::new(),
            suggestions: Vec::new(),
            timestamp: Timestamp::now(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            ..Self::user(text)
        }
    }

    pub fn with_sop_references(mut self, refs: Vec<SopReference>) -> Self {
        self.sop_references = refs;
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }
}

/// What the assistant may draw on: the case, the reasoning trace so far and
/// the conversation up to now.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatContext {
    pub case: Option<Case>,
    pub steps: Vec<ReasoningStep>,
    pub history: Vec<ChatMessage>,
}

impl ChatContext {
    pub fn new() -> Self {
        Self {
            case: None,
            steps: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn for_case(case: Case) -> Self {
        Self {
            case: Some(case),
            ..Self::new()
        }
    }

    pub fn with_steps(mut self, steps: Vec<ReasoningStep>) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }
}

impl Default for ChatContext {
    fn default() -> Self {
        Self::new()
    }
}
