//! Pre-screening policy configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::screening::ScreeningPolicy;

/// Confidence per decision tier and the high-value claim threshold
#[derive(Debug, Clone, Deserialize)]
pub struct ScreeningConfig {
    #[serde(default = "default_decision_confidence")]
    pub deny_confidence: f64,

    #[serde(default = "default_decision_confidence")]
    pub approve_confidence: f64,

    #[serde(default = "default_review_confidence")]
    pub review_confidence: f64,

    #[serde(default = "default_high_value_threshold")]
    pub high_value_threshold: f64,
}

impl ScreeningConfig {
    /// Validate screening configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        let tiers = [
            ("deny_confidence", self.deny_confidence),
            ("approve_confidence", self.approve_confidence),
            ("review_confidence", self.review_confidence),
        ];
        for (field, value) in tiers {
            if !(0.0..=1.0).contains(&value) {
                errors.push(ValidationError::ConfidenceOutOfRange { field });
            }
        }
        if self.review_confidence > self.deny_confidence.min(self.approve_confidence) {
            errors.push(ValidationError::ReviewAboveDecision);
        }
        if !self.high_value_threshold.is_finite() || self.high_value_threshold < 0.0 {
            errors.push(ValidationError::InvalidThreshold);
        }
        ValidationError::collect(errors)
    }

    pub fn policy(&self) -> Result<ScreeningPolicy, ValidationError> {
        self.validate()?;
        ScreeningPolicy::new(
            self.deny_confidence,
            self.approve_confidence,
            self.review_confidence,
            self.high_value_threshold,
        )
        .map_err(|_| ValidationError::ReviewAboveDecision)
    }
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            deny_confidence: default_decision_confidence(),
            approve_confidence: default_decision_confidence(),
            review_confidence: default_review_confidence(),
            high_value_threshold: default_high_value_threshold(),
        }
    }
}

fn default_decision_confidence() -> f64 {
    0.9
}

fn default_review_confidence() -> f64 {
    0.7
}

fn default_high_value_threshold() -> f64 {
    10_000.0
}
