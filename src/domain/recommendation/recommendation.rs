use serde::{Deserialize, Serialize};

use super::{Action, StatedAction};
use crate::domain::foundation::Confidence;

/// A proposed decision for a case, with its justification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(default = "unstated")]
    pub action: StatedAction,
    pub reason: String,
    #[serde(default)]
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sop_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sop_refs: Vec<String>,
}

fn unstated() -> StatedAction {
    StatedAction::Unstated
}

impl Recommendation {
    /// Creates a recommendation with a structured action.
    pub fn new(action: Action, reason: impl Into<String>, confidence: Confidence) -> Self {
        Self {
            action: StatedAction::Structured(action),
            reason: reason.into(),
            confidence,
            sop_reference: None,
            sop_refs: Vec::new(),
        }
    }

    /// Creates a recommendation whose action is only expressed in prose.
    pub fn from_text(reason: impl Into<String>, confidence: Confidence) -> Self {
        Self {
            action: StatedAction::Unstated,
            reason: reason.into(),
            confidence,
            sop_reference: None,
            sop_refs: Vec::new(),
        }
    }

    pub fn with_action(mut self, action: StatedAction) -> Self {
        self.action = action;
        self
    }

    pub fn with_sop_reference(mut self, reference: impl Into<String>) -> Self {
        self.sop_reference = Some(reference.into());
        self
    }

    pub fn with_sop_refs(mut self, refs: Vec<String>) -> Self {
        self.sop_refs = refs;
        self
    }

    /// The structured action, if the recommendation states one.
    pub fn structured_action(&self) -> Option<Action> {
        self.action.structured()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_camel_case_fields() {
        let rec = Recommendation::new(Action::Deny, "Missing bill (N26)", Confidence::new(0.9))
            .with_sop_reference("Page 9")
            .with_sop_refs(vec!["SOP 3.1".to_string()]);
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["action"], "DENY");
        assert_eq!(value["sopReference"], "Page 9");
        assert_eq!(value["sopRefs"], json!(["SOP 3.1"]));
    }

    #[test]
    fn free_text_recommendation_has_no_structured_action() {
        let rec = Recommendation::from_text("The claim should be denied", Confidence::new(0.8));
        assert_eq!(rec.structured_action(), None);
        let value = serde_json::to_value(&rec).unwrap();
        assert!(value["action"].is_null());
    }

    #[test]
    fn deserializes_without_action_field() {
        let rec: Recommendation =
            serde_json::from_value(json!({ "reason": "Looks fine, proceed" })).unwrap();
        assert_eq!(rec.action, StatedAction::Unstated);
        assert_eq!(rec.confidence, Confidence::ZERO);
    }
}
