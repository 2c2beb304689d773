//! Action extraction from free-text recommendations.

use crate::domain::recommendation::Action;

/// Reads an action out of prose.
///
/// Implementations must check DENY before APPROVE before REVIEW, since a
/// single sentence can contain several trigger words.
pub trait ActionClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Option<Action>;
}

/// Ordered substring matching over case-folded text.
#[derive(Debug, Clone)]
pub struct KeywordActionClassifier {
    rules: Vec<(Action, Vec<String>)>,
}

impl Default for KeywordActionClassifier {
    fn default() -> Self {
        Self {
            rules: vec![
                (Action::Deny, words(&["should be denied", "deny"])),
                (Action::Approve, words(&["approve", "proceed", "process"])),
                (Action::Review, words(&["requires review", "review"])),
            ],
        }
    }
}

impl KeywordActionClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule checked after the built-in ones.
    pub fn with_rule(mut self, action: Action, keywords: &[&str]) -> Self {
        self.rules.push((action, words(keywords)));
        self
    }
}

impl ActionClassifier for KeywordActionClassifier {
    fn classify(&self, text: &str) -> Option<Action> {
        let folded = text.to_lowercase();
        self.rules
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| folded.contains(k.as_str())))
            .map(|(action, _)| *action)
    }
}

fn words(keywords: &[&str]) -> Vec<String> {
    keywords.iter().map(|k| k.to_lowercase()).collect()
}
