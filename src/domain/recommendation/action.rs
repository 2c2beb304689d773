use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Decision a recommendation proposes for a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Approve,
    Deny,
    Review,
    RequestInfo,
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::Approve,
        Action::Deny,
        Action::Review,
        Action::RequestInfo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Approve => "APPROVE",
            Action::Deny => "DENY",
            Action::Review => "REVIEW",
            Action::RequestInfo => "REQUEST_INFO",
        }
    }

    /// Parses an action label, case-insensitively.
    ///
    /// `PROCESS` is a synonym for `APPROVE`. Separators between words may be
    /// underscores, hyphens or spaces.
    pub fn parse_label(label: &str) -> Option<Action> {
        let normalized: String = label
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();
        match normalized.as_str() {
            "APPROVE" | "PROCESS" => Some(Action::Approve),
            "DENY" => Some(Action::Deny),
            "REVIEW" => Some(Action::Review),
            "REQUEST_INFO" => Some(Action::RequestInfo),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::parse_label(s).ok_or_else(|| {
            ValidationError::invalid_format("action", format!("unknown action '{}'", s))
        })
    }
}

/// How a recommendation states its action.
///
/// Rule-based recommendations always carry a structured action. Agent
/// output may carry a raw label that is not one of the known actions, or
/// no action at all, in which case the action has to be read out of the
/// reason text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum StatedAction {
    Structured(Action),
    Label(String),
    Unstated,
}

impl StatedAction {
    pub fn structured(&self) -> Option<Action> {
        match self {
            StatedAction::Structured(action) => Some(*action),
            _ => None,
        }
    }
}

impl From<Action> for StatedAction {
    fn from(action: Action) -> Self {
        StatedAction::Structured(action)
    }
}

impl From<Option<String>> for StatedAction {
    fn from(raw: Option<String>) -> Self {
        match raw {
            None => StatedAction::Unstated,
            Some(label) if label.trim().is_empty() => StatedAction::Unstated,
            Some(label) => match Action::parse_label(&label) {
                Some(action) => StatedAction::Structured(action),
                None => StatedAction::Label(label),
            },
        }
    }
}

impl From<StatedAction> for Option<String> {
    fn from(stated: StatedAction) -> Self {
        match stated {
            StatedAction::Structured(action) => Some(action.as_str().to_string()),
            StatedAction::Label(label) => Some(label),
            StatedAction::Unstated => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_label_is_case_insensitive() {
        assert_eq!(Action::parse_label("deny"), Some(Action::Deny));
        assert_eq!(Action::parse_label(" Approve "), Some(Action::Approve));
        assert_eq!(Action::parse_label("request-info"), Some(Action::RequestInfo));
        assert_eq!(Action::parse_label("Request Info"), Some(Action::RequestInfo));
    }

    #[test]
    fn process_is_a_synonym_for_approve() {
        assert_eq!(Action::parse_label("PROCESS"), Some(Action::Approve));
        assert_eq!(Action::parse_label("process"), Some(Action::Approve));
    }

    #[test]
    fn unknown_labels_do_not_parse() {
        assert_eq!(Action::parse_label("escalate"), None);
        assert!("escalate".parse::<Action>().is_err());
    }

    #[test]
    fn action_serializes_screaming_case() {
        let json = serde_json::to_string(&Action::RequestInfo).unwrap();
        assert_eq!(json, "\"REQUEST_INFO\"");
    }

    #[test]
    fn stated_action_reads_known_labels_as_structured() {
        let stated: StatedAction = serde_json::from_str("\"process\"").unwrap();
        assert_eq!(stated, StatedAction::Structured(Action::Approve));
    }

    #[test]
    fn stated_action_keeps_unknown_labels() {
        let stated: StatedAction = serde_json::from_str("\"ESCALATE\"").unwrap();
        assert_eq!(stated, StatedAction::Label("ESCALATE".to_string()));
    }

    #[test]
    fn stated_action_null_is_unstated() {
        let stated: StatedAction = serde_json::from_str("null").unwrap();
        assert_eq!(stated, StatedAction::Unstated);
        assert_eq!(serde_json::to_string(&stated).unwrap(), "null");
    }
}
