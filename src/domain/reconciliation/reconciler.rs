//! RecommendationReconciler - compares the rule-based and AI recommendations.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::classifier::{ActionClassifier, KeywordActionClassifier};
use crate::domain::recommendation::{Action, Recommendation, StatedAction};

/// Whether the two recommendations agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgreementStatus {
    Agree,
    Disagree,
    /// At least one side has no recognizable action.
    Unknown,
}

/// Comparison outcome with the normalized action of each side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    pub status: AgreementStatus,
    pub rule_based_action: Option<Action>,
    pub ai_action: Option<Action>,
}

#[derive(Clone)]
pub struct RecommendationReconciler {
    classifier: Arc<dyn ActionClassifier>,
}

impl Default for RecommendationReconciler {
    fn default() -> Self {
        Self::new(Arc::new(KeywordActionClassifier::new()))
    }
}

impl RecommendationReconciler {
    pub fn new(classifier: Arc<dyn ActionClassifier>) -> Self {
        Self { classifier }
    }

    pub fn compare(&self, rule_based: &Recommendation, ai: &Recommendation) -> AgreementStatus {
        self.reconcile(rule_based, ai).status
    }

    pub fn reconcile(&self, rule_based: &Recommendation, ai: &Recommendation) -> Reconciliation {
        let rule_based_action = self.normalize(rule_based);
        let ai_action = self.normalize(ai);
        let status = match (rule_based_action, ai_action) {
            (Some(a), Some(b)) if a == b => AgreementStatus::Agree,
            (Some(_), Some(_)) => AgreementStatus::Disagree,
            _ => AgreementStatus::Unknown,
        };
        Reconciliation {
            status,
            rule_based_action,
            ai_action,
        }
    }

    /// Structured actions pass through. A raw label is parsed, then
    /// classified as prose. An unstated action is read out of the reason.
    pub fn normalize(&self, recommendation: &Recommendation) -> Option<Action> {
        match &recommendation.action {
            StatedAction::Structured(action) => Some(*action),
            StatedAction::Label(label) => {
                Action::parse_label(label).or_else(|| self.classifier.classify(label))
            }
            StatedAction::Unstated => self.classifier.classify(&recommendation.reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Confidence;
    use proptest::prelude::*;

    fn structured(action: Action) -> Recommendation {
        Recommendation::new(action, "rule-based", Confidence::new(0.9))
    }

    fn free_text(text: &str) -> Recommendation {
        Recommendation::from_text(text, Confidence::new(0.8))
    }

    #[test]
    fn free_text_denial_disagrees_with_rule_based_approval() {
        let reconciler = RecommendationReconciler::default();
        let ai = free_text("The claim should be denied due to missing authorization");

        let result = reconciler.reconcile(&structured(Action::Approve), &ai);

        assert_eq!(result.ai_action, Some(Action::Deny));
        assert_eq!(result.rule_based_action, Some(Action::Approve));
        assert_eq!(result.status, AgreementStatus::Disagree);
    }

    #[test]
    fn process_label_agrees_with_approve() {
        let reconciler = RecommendationReconciler::default();
        let ai = free_text("ok").with_action(StatedAction::Label("process".to_string()));

        assert_eq!(reconciler.compare(&structured(Action::Approve), &ai), AgreementStatus::Agree);
    }

    #[test]
    fn unrecognized_label_falls_back_to_classifier() {
        let reconciler = RecommendationReconciler::default();
        let ai = free_text("").with_action(StatedAction::Label("Recommend: deny payment".to_string()));

        assert_eq!(reconciler.normalize(&ai), Some(Action::Deny));
    }

    #[test]
    fn unclassifiable_text_is_unknown() {
        let reconciler = RecommendationReconciler::default();
        let ai = free_text("Insufficient data to decide");

        let result = reconciler.reconcile(&structured(Action::Deny), &ai);

        assert_eq!(result.ai_action, None);
        assert_eq!(result.status, AgreementStatus::Unknown);
    }

    #[test]
    fn reconciliation_serializes_camel_case() {
        let reconciler = RecommendationReconciler::default();
        let result = reconciler.reconcile(&structured(Action::Review), &structured(Action::Review));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "agree");
        assert_eq!(json["ruleBasedAction"], "REVIEW");
        assert_eq!(json["aiAction"], "REVIEW");
    }

    #[test]
    fn custom_classifier_is_used() {
        struct AlwaysReview;
        impl ActionClassifier for AlwaysReview {
            fn classify(&self, _text: &str) -> Option<Action> {
                Some(Action::Review)
            }
        }
        let reconciler = RecommendationReconciler::new(Arc::new(AlwaysReview));

        assert_eq!(
            reconciler.compare(&structured(Action::Review), &free_text("deny it")),
            AgreementStatus::Agree
        );
    }

    fn any_action() -> impl Strategy<Value = Action> {
        prop::sample::select(Action::ALL.to_vec())
    }

    fn any_recommendation() -> impl Strategy<Value = Recommendation> {
        prop_oneof![
            any_action().prop_map(structured),
            "[a-zA-Z ]{0,40}".prop_map(|s| free_text(&s)),
            prop::sample::select(vec!["deny", "Process", "APPROVE", "request-info", "later"])
                .prop_map(|label| free_text("").with_action(StatedAction::Label(label.to_string()))),
        ]
    }

    proptest! {
        #[test]
        fn same_action_always_agrees(action in any_action()) {
            let reconciler = RecommendationReconciler::default();
            let r = structured(action);
            prop_assert_eq!(reconciler.compare(&r, &r), AgreementStatus::Agree);
        }

        #[test]
        fn agreement_is_symmetric(a in any_recommendation(), b in any_recommendation()) {
            let reconciler = RecommendationReconciler::default();
            prop_assert_eq!(reconciler.compare(&a, &b), reconciler.compare(&b, &a));
        }
    }
}
