//! Agent vocabulary shared by the orchestrator and agent implementations.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::case::Case;
use crate::domain::foundation::{Confidence, RunId};
use crate::domain::recommendation::Recommendation;
use crate::domain::sop::SopDocument;

/// The reasoning agents, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    Analysis,
    #[serde(rename = "SOPMatch")]
    SopMatch,
    RiskAssessment,
    Recommendation,
}

impl AgentKind {
    pub const ORDER: [AgentKind; 4] = [
        AgentKind::Analysis,
        AgentKind::SopMatch,
        AgentKind::RiskAssessment,
        AgentKind::Recommendation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Analysis => "Analysis",
            AgentKind::SopMatch => "SOPMatch",
            AgentKind::RiskAssessment => "RiskAssessment",
            AgentKind::Recommendation => "Recommendation",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An SOP the SOPMatch agent may choose from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSop {
    pub key: String,
    pub sop: SopDocument,
}

/// Everything an agent sees: the case and the steps before it.
#[derive(Debug, Clone)]
pub struct AgentInput {
    pub run_id: RunId,
    pub case: Case,
    pub prior: Vec<ReasoningStep>,
    pub candidate_sops: Vec<CandidateSop>,
}

impl AgentInput {
    pub fn prior_step(&self, agent: AgentKind) -> Option<&ReasoningStep> {
        self.prior.iter().find(|s| s.agent == agent)
    }
}

/// What an agent produced.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentOutput {
    pub text: String,
    pub confidence: Confidence,
    pub sop_refs: Vec<String>,
    /// Set by the Recommendation agent.
    pub recommendation: Option<Recommendation>,
}

impl AgentOutput {
    pub fn new(text: impl Into<String>, confidence: Confidence) -> Self {
        Self {
            text: text.into(),
            confidence,
            sop_refs: Vec::new(),
            recommendation: None,
        }
    }

    pub fn with_sop_refs(mut self, refs: Vec<String>) -> Self {
        self.sop_refs = refs;
        self
    }

    pub fn with_recommendation(mut self, recommendation: Recommendation) -> Self {
        self.recommendation = Some(recommendation);
        self
    }
}

/// One entry of the reasoning trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningStep {
    /// 1-based position in the trace.
    pub step: usize,
    pub agent: AgentKind,
    pub text: String,
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sop_refs: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_kind_serializes_with_display_names() {
        assert_eq!(serde_json::to_string(&AgentKind::SopMatch).unwrap(), "\"SOPMatch\"");
        assert_eq!(
            serde_json::to_string(&AgentKind::RiskAssessment).unwrap(),
            "\"RiskAssessment\""
        );
        let kind: AgentKind = serde_json::from_str("\"SOPMatch\"").unwrap();
        assert_eq!(kind, AgentKind::SopMatch);
    }

    #[test]
    fn order_ends_with_recommendation() {
        assert_eq!(AgentKind::ORDER[0], AgentKind::Analysis);
        assert_eq!(AgentKind::ORDER[3], AgentKind::Recommendation);
    }
}
