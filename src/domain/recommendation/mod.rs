//! Recommendations produced by the rule engine and by the reasoning agents.

mod action;
mod recommendation;

pub use action::{Action, StatedAction};
pub use recommendation::Recommendation;
