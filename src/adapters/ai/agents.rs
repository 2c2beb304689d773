//! Reasoning agents backed by an AIProvider.
//!
//! Each agent sends one completion request with its own system prompt. The
//! user message carries the case, the steps so far and, for SOPMatch, the
//! candidate SOPs.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{Confidence, ValidationError};
use crate::domain::reasoning::{AgentInput, AgentKind, AgentOutput, AgentRoster, CandidateSop};
use crate::domain::recommendation::{Action, Recommendation, StatedAction};
use crate::ports::{AIError, AIProvider, CompletionRequest, MessageRole, ReasoningAgent, RequestMetadata};

const ACTION_PREFIX: &str = "ACTION:";
const CONFIDENCE_PREFIX: &str = "CONFIDENCE:";

/// Sampling settings shared by the agents.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_tokens: 600,
            temperature: 0.2,
        }
    }
}

pub struct ProviderAgent {
    kind: AgentKind,
    provider: Arc<dyn AIProvider>,
    settings: AgentSettings,
}

impl ProviderAgent {
    pub fn new(kind: AgentKind, provider: Arc<dyn AIProvider>) -> Self {
        Self {
            kind,
            provider,
            settings: AgentSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: AgentSettings) -> Self {
        self.settings = settings;
        self
    }

    fn request(&self, input: &AgentInput) -> CompletionRequest {
        CompletionRequest::new(
            RequestMetadata::new(self.kind.as_str())
                .for_case(input.case.id.clone())
                .for_run(input.run_id),
        )
        .with_system_prompt(system_prompt(self.kind))
        .with_message(MessageRole::User, user_prompt(self.kind, input))
        .with_max_tokens(self.settings.max_tokens)
        .with_temperature(self.settings.temperature)
    }
}

#[async_trait]
impl ReasoningAgent for ProviderAgent {
    fn kind(&self) -> AgentKind {
        self.kind
    }

    async fn run(&self, input: &AgentInput) -> Result<AgentOutput, AIError> {
        let response = self.provider.complete(self.request(input)).await?;
        let (body, confidence) = take_confidence(&response.content);
        let confidence = confidence.unwrap_or_else(|| default_confidence(self.kind));

        let output = match self.kind {
            AgentKind::SopMatch => {
                let refs = matched_sops(&body, &input.candidate_sops);
                AgentOutput::new(body, confidence).with_sop_refs(refs)
            }
            AgentKind::Recommendation => {
                let (action, reason) = take_action(&body);
                let recommendation = Recommendation::from_text(reason.clone(), confidence).with_action(action);
                AgentOutput::new(reason, confidence).with_recommendation(recommendation)
            }
            _ => AgentOutput::new(body, confidence),
        };
        Ok(output)
    }
}

/// The four agents over one provider.
pub fn default_roster(provider: Arc<dyn AIProvider>, settings: AgentSettings) -> Result<AgentRoster, ValidationError> {
    let agent = |kind| -> Arc<dyn ReasoningAgent> {
        Arc::new(ProviderAgent::new(kind, provider.clone()).with_settings(settings.clone()))
    };
    AgentRoster::new(
        agent(AgentKind::Analysis),
        agent(AgentKind::SopMatch),
        agent(AgentKind::RiskAssessment),
        agent(AgentKind::Recommendation),
    )
}

fn default_confidence(kind: AgentKind) -> Confidence {
    Confidence::new(match kind {
        AgentKind::Analysis => 0.9,
        AgentKind::SopMatch => 0.88,
        AgentKind::RiskAssessment => 0.85,
        AgentKind::Recommendation => 0.87,
    })
}

fn system_prompt(kind: AgentKind) -> &'static str {
    match kind {
        AgentKind::Analysis => {
            "You are a case analysis agent. Summarize the facts of the case that matter for a \
coverage decision: completeness of the record, amounts, dates and anything unusual. Be concise."
        }
        AgentKind::SopMatch => {
            "You are an SOP matching agent. From the candidate SOPs listed, name the ones that \
govern this case by their title or page, and say briefly why each applies."
        }
        AgentKind::RiskAssessment => {
            "You are a risk assessment agent. Rate the risk of an incorrect decision on this case \
as low, moderate or high and name the factors behind the rating."
        }
        AgentKind::Recommendation => {
            "You are a recommendation agent. Begin your answer with a line of the form \
'ACTION: <APPROVE|DENY|REVIEW|REQUEST_INFO>', then give the reason in one short paragraph. \
You may end with 'CONFIDENCE: <0..1>'."
        }
    }
}

fn user_prompt(kind: AgentKind, input: &AgentInput) -> String {
    let mut prompt = format!("Case: {}", input.case.summary());
    if !input.prior.is_empty() {
        prompt.push_str("\n\nPrevious steps:");
        for step in &input.prior {
            prompt.push_str(&format!("\n{}. [{}] {}", step.step, step.agent, step.text));
        }
    }
    if kind == AgentKind::SopMatch {
        prompt.push_str("\n\nCandidate SOPs:");
        if input.candidate_sops.is_empty() {
            prompt.push_str("\n(none in catalog)");
        }
        for candidate in &input.candidate_sops {
            prompt.push_str(&format!(
                "\n- {} ({}, state {})",
                candidate.sop.title,
                candidate.sop.reference(),
                candidate.sop.state
            ));
            for step in &candidate.sop.steps {
                prompt.push_str(&format!("\n    * {}", step));
            }
        }
    }
    prompt
}

/// Candidate SOPs the text names by key, title or page. All candidates
/// when it names none.
fn matched_sops(text: &str, candidates: &[CandidateSop]) -> Vec<String> {
    let folded = text.to_lowercase();
    let named: Vec<String> = candidates
        .iter()
        .filter(|c| {
            let reference = c.sop.reference().to_lowercase();
            folded.contains(&c.key.to_lowercase())
                || folded.contains(&c.sop.title.to_lowercase())
                || (reference != c.sop.title.to_lowercase() && folded.contains(&reference))
        })
        .map(|c| c.sop.title.clone())
        .collect();
    if named.is_empty() {
        candidates.iter().map(|c| c.sop.title.clone()).collect()
    } else {
        named
    }
}

/// Splits a leading `ACTION:` line off the text.
fn take_action(text: &str) -> (StatedAction, String) {
    let trimmed = text.trim_start();
    let (first, rest) = trimmed.split_once('\n').unwrap_or((trimmed, ""));
    let Some(label) = strip_prefix_ignore_case(first.trim(), ACTION_PREFIX) else {
        return (StatedAction::Unstated, text.trim().to_string());
    };
    let label = label.trim();
    let action = match Action::parse_label(label) {
        Some(action) => StatedAction::Structured(action),
        None if label.is_empty() => StatedAction::Unstated,
        None => StatedAction::Label(label.to_string()),
    };
    (action, rest.trim().to_string())
}

/// Removes a trailing `CONFIDENCE:` line and parses it.
fn take_confidence(text: &str) -> (String, Option<Confidence>) {
    let trimmed = text.trim_end();
    let (head, last) = trimmed.rsplit_once('\n').unwrap_or(("", trimmed));
    match strip_prefix_ignore_case(last.trim(), CONFIDENCE_PREFIX)
        .and_then(|v| v.trim().trim_end_matches('%').parse::<f64>().ok())
    {
        Some(value) => {
            let value = if value > 1.0 { value / 100.0 } else { value };
            (head.trim().to_string(), Some(Confidence::new(value)))
        }
        None => (text.trim().to_string(), None),
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}
