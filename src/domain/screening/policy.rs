//! Final recommendation policy for pre-screening.

use super::step::StepResult;
use crate::domain::foundation::{Confidence, ValidationError};
use crate::domain::recommendation::{Action, Recommendation};

/// Confidence per decision tier plus the thresholds checks consult.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreeningPolicy {
    pub deny_confidence: Confidence,
    pub approve_confidence: Confidence,
    pub review_confidence: Confidence,
    pub high_value_threshold: f64,
}

impl Default for ScreeningPolicy {
    fn default() -> Self {
        Self {
            deny_confidence: Confidence::new(0.9),
            approve_confidence: Confidence::new(0.9),
            review_confidence: Confidence::new(0.7),
            high_value_threshold: 10_000.0,
        }
    }
}

impl ScreeningPolicy {
    /// Creates a policy, requiring REVIEW to be the least confident tier.
    pub fn new(
        deny: f64,
        approve: f64,
        review: f64,
        high_value_threshold: f64,
    ) -> Result<Self, ValidationError> {
        let deny_confidence = Confidence::try_new(deny)?;
        let approve_confidence = Confidence::try_new(approve)?;
        let review_confidence = Confidence::try_new(review)?;
        if review > deny.min(approve) {
            return Err(ValidationError::invalid_format(
                "review_confidence",
                "must not exceed deny or approve confidence",
            ));
        }
        if !high_value_threshold.is_finite() || high_value_threshold < 0.0 {
            return Err(ValidationError::invalid_format(
                "high_value_threshold",
                "must be a non-negative number",
            ));
        }
        Ok(Self {
            deny_confidence,
            approve_confidence,
            review_confidence,
            high_value_threshold,
        })
    }

    /// Derives the rule-based recommendation from the completed steps.
    ///
    /// Any error step denies; otherwise any warning step sends the case to
    /// review; otherwise the case is approved.
    pub fn recommend(&self, steps: &[StepResult]) -> Recommendation {
        let errors: Vec<&str> = steps
            .iter()
            .filter(|s| s.is_error())
            .map(|s| s.action.as_str())
            .collect();
        if !errors.is_empty() {
            return Recommendation::new(Action::Deny, errors.join("; "), self.deny_confidence);
        }

        let warnings: Vec<&str> = steps
            .iter()
            .filter(|s| s.is_warning())
            .map(|s| s.action.as_str())
            .collect();
        if !warnings.is_empty() {
            return Recommendation::new(Action::Review, warnings.join("; "), self.review_confidence);
        }

        Recommendation::new(
            Action::Approve,
            format!("All {} pre-screening checks passed", steps.len()),
            self.approve_confidence,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::screening::StepStatus;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn step(status: StepStatus, action: &str) -> StepResult {
        StepResult {
            step: 1,
            check: "c".to_string(),
            title: "t".to_string(),
            status,
            action: action.to_string(),
            denial_code: None,
            details: BTreeMap::new(),
        }
    }

    #[test]
    fn errors_deny_with_concatenated_actions() {
        let rec = ScreeningPolicy::default().recommend(&[
            step(StepStatus::Error, "Itemized bill missing (N26)"),
            step(StepStatus::Warning, "Days exceed authorization"),
            step(StepStatus::Error, "Provider not eligible (N24)"),
        ]);
        assert_eq!(rec.structured_action(), Some(Action::Deny));
        assert_eq!(rec.reason, "Itemized bill missing (N26); Provider not eligible (N24)");
        assert_eq!(rec.confidence, Confidence::new(0.9));
    }

    #[test]
    fn warnings_without_errors_review() {
        let rec = ScreeningPolicy::default().recommend(&[
            step(StepStatus::Success, "ok"),
            step(StepStatus::Warning, "SSN unavailable"),
        ]);
        assert_eq!(rec.structured_action(), Some(Action::Review));
        assert_eq!(rec.confidence, Confidence::new(0.7));
    }

    #[test]
    fn clean_steps_approve() {
        let rec = ScreeningPolicy::default().recommend(&[step(StepStatus::Success, "ok")]);
        assert_eq!(rec.structured_action(), Some(Action::Approve));
        assert_eq!(rec.confidence, Confidence::new(0.9));
    }

    #[test]
    fn new_rejects_review_above_other_tiers() {
        assert!(ScreeningPolicy::new(0.9, 0.9, 0.95, 100.0).is_err());
        assert!(ScreeningPolicy::new(0.8, 0.85, 0.6, 100.0).is_ok());
        assert!(ScreeningPolicy::new(1.2, 0.9, 0.7, 100.0).is_err());
    }

    fn status_strategy() -> impl Strategy<Value = StepStatus> {
        prop_oneof![
            Just(StepStatus::Success),
            Just(StepStatus::Warning),
            Just(StepStatus::Error),
        ]
    }

    proptest! {
        #[test]
        fn action_follows_worst_status(statuses in prop::collection::vec(status_strategy(), 0..12)) {
            let steps: Vec<StepResult> = statuses.iter().map(|s| step(*s, "x")).collect();
            let rec = ScreeningPolicy::default().recommend(&steps);
            let has_error = statuses.contains(&StepStatus::Error);
            let has_warning = statuses.contains(&StepStatus::Warning);

            prop_assert_eq!(rec.structured_action() == Some(Action::Deny), has_error);
            prop_assert_eq!(rec.structured_action() == Some(Action::Review), !has_error && has_warning);
            prop_assert_eq!(rec.structured_action() == Some(Action::Approve), !has_error && !has_warning);
        }
    }
}
