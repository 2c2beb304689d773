//! Reconciliation of the rule-based and AI recommendations.

mod classifier;
mod reconciler;

pub use classifier::{ActionClassifier, KeywordActionClassifier};
pub use reconciler::{AgreementStatus, Reconciliation, RecommendationReconciler};
