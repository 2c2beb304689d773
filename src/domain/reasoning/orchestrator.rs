//! ReasoningOrchestrator - runs the reasoning agents in a fixed order.
//!
//! Analysis → SOPMatch → RiskAssessment → Recommendation. Each agent sees the
//! steps before it. Steps are delivered through the caller's event sink,
//! either whole or typed out character by character on a ticker bound to
//! the run's cancellation. The first failure, timeout or cancellation ends
//! the run with the steps already delivered; no stand-in recommendation is
//! produced.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;

use super::agent::{AgentInput, AgentKind, AgentOutput, CandidateSop, ReasoningStep};
use super::errors::{AgentError, ReasoningFailure};
use super::run_context::{RunConfig, RunContext};
use crate::domain::case::Case;
use crate::domain::foundation::{millis, RunId, ValidationError};
use crate::domain::recommendation::Recommendation;
use crate::domain::transparency::{LogEntry, LogStatus, TransparencyLog};
use crate::ports::{ReasoningAgent, SopCatalog};

const ORCHESTRATOR_API: &str = "ReasoningOrchestrator";

/// Incremental output of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReasoningEvent {
    /// Next character of a step being typed out.
    Typing { agent: AgentKind, delta: String },
    /// A complete step. Emitted once per agent.
    Step { step: ReasoningStep },
}

/// Output of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningResult {
    pub run_id: RunId,
    pub steps: Vec<ReasoningStep>,
    pub recommendation: Recommendation,
    pub log: TransparencyLog,
    #[serde(with = "millis", rename = "totalTimeMs")]
    pub total_time: Duration,
}

/// One agent per slot.
#[derive(Clone)]
pub struct AgentRoster {
    analysis: Arc<dyn ReasoningAgent>,
    sop_match: Arc<dyn ReasoningAgent>,
    risk_assessment: Arc<dyn ReasoningAgent>,
    recommendation: Arc<dyn ReasoningAgent>,
}

impl AgentRoster {
    /// Creates a roster, checking each agent fills the slot it is given.
    pub fn new(
        analysis: Arc<dyn ReasoningAgent>,
        sop_match: Arc<dyn ReasoningAgent>,
        risk_assessment: Arc<dyn ReasoningAgent>,
        recommendation: Arc<dyn ReasoningAgent>,
    ) -> Result<Self, ValidationError> {
        let roster = Self {
            analysis,
            sop_match,
            risk_assessment,
            recommendation,
        };
        for kind in AgentKind::ORDER {
            let actual = roster.get(kind).kind();
            if actual != kind {
                return Err(ValidationError::invalid_format(
                    "agents",
                    format!("{} slot holds a {} agent", kind, actual),
                ));
            }
        }
        Ok(roster)
    }

    pub fn get(&self, kind: AgentKind) -> &Arc<dyn ReasoningAgent> {
        match kind {
            AgentKind::Analysis => &self.analysis,
            AgentKind::SopMatch => &self.sop_match,
            AgentKind::RiskAssessment => &self.risk_assessment,
            AgentKind::Recommendation => &self.recommendation,
        }
    }
}

pub struct ReasoningOrchestrator {
    agents: AgentRoster,
    catalog: Arc<dyn SopCatalog>,
    config: RunConfig,
}

impl ReasoningOrchestrator {
    pub fn new(agents: AgentRoster, catalog: Arc<dyn SopCatalog>, config: RunConfig) -> Self {
        Self {
            agents,
            catalog,
            config,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Runs all agents against the case.
    ///
    /// `on_event` is called in emission order and never after the run
    /// observes cancellation.
    pub async fn run<F>(
        &self,
        ctx: &RunContext,
        case: &Case,
        mut on_event: F,
    ) -> Result<ReasoningResult, ReasoningFailure>
    where
        F: FnMut(ReasoningEvent) + Send,
    {
        if let Err(err) = case.validate() {
            return Err(ReasoningFailure {
                error: err.into(),
                partial: Vec::new(),
                log: TransparencyLog::new(),
            });
        }

        let started = Instant::now();
        let run_id = ctx.run_id();
        tracing::info!(%run_id, case_id = %case.id, streaming = self.config.streaming, "Reasoning run started");

        let candidate_sops: Vec<CandidateSop> = self
            .catalog
            .applicable_for(case)
            .iter()
            .map(|def| CandidateSop {
                key: def.key.clone(),
                sop: def.sop.clone(),
            })
            .collect();

        let mut steps: Vec<ReasoningStep> = Vec::with_capacity(AgentKind::ORDER.len());
        let mut log = TransparencyLog::new();
        let mut matched_sops: Vec<String> = Vec::new();
        let mut recommendation: Option<Recommendation> = None;

        for kind in AgentKind::ORDER {
            let agent = self.agents.get(kind);
            let input = AgentInput {
                run_id,
                case: case.clone(),
                prior: steps.clone(),
                candidate_sops: candidate_sops.clone(),
            };

            let agent_started = Instant::now();
            let outcome = self.invoke(ctx, agent.as_ref(), &input).await;
            let elapsed = agent_started.elapsed();

            let output = match outcome {
                Ok(output) => output,
                Err(err) => {
                    log.record(
                        LogEntry::step(kind.as_str(), agent.api_name(), LogStatus::Error, elapsed)
                            .with_detail("error", err.to_string()),
                    );
                    return Err(abort(err, steps, log, started, run_id));
                }
            };
            tracing::debug!(%run_id, agent = %kind, elapsed_ms = elapsed.as_millis() as u64, "Agent finished");

            let step = ReasoningStep {
                step: steps.len() + 1,
                agent: kind,
                text: output.text.clone(),
                confidence: output.confidence,
                sop_refs: output.sop_refs.clone(),
            };

            match kind {
                AgentKind::SopMatch => matched_sops = output.sop_refs.clone(),
                AgentKind::Recommendation => {
                    recommendation = Some(finalize_recommendation(output, &matched_sops));
                }
                _ => {}
            }

            if let Err(err) = self.deliver(ctx, &step, &mut on_event).await {
                log.record(
                    LogEntry::step(kind.as_str(), agent.api_name(), LogStatus::Error, elapsed)
                        .with_detail("error", err.to_string()),
                );
                return Err(abort(err, steps, log, started, run_id));
            }
            log.record(LogEntry::step(kind.as_str(), agent.api_name(), LogStatus::Success, elapsed));
            steps.push(step);
        }

        let Some(recommendation) = recommendation else {
            let err = AgentError::Failed {
                agent: AgentKind::Recommendation,
                message: "no recommendation produced".to_string(),
            };
            return Err(abort(err, steps, log, started, run_id));
        };

        let total_time = started.elapsed();
        log.record(LogEntry::summary("Reasoning complete", ORCHESTRATOR_API, LogStatus::Success, total_time));
        tracing::info!(%run_id, action = ?recommendation.structured_action(), "Reasoning run finished");

        Ok(ReasoningResult {
            run_id,
            steps,
            recommendation,
            log,
            total_time,
        })
    }

    /// Calls one agent, bounded by the per-agent timeout and the run's
    /// cancellation.
    async fn invoke(
        &self,
        ctx: &RunContext,
        agent: &dyn ReasoningAgent,
        input: &AgentInput,
    ) -> Result<AgentOutput, AgentError> {
        let kind = agent.kind();
        let timeout = self.config.agent_timeout;
        let call = async move {
            let result = match timeout {
                Some(limit) => match tokio::time::timeout(limit, agent.run(input)).await {
                    Ok(result) => result,
                    Err(_) => return Err(AgentError::TimedOut { agent: kind, after: limit }),
                },
                None => agent.run(input).await,
            };
            result.map_err(|e| AgentError::Failed {
                agent: kind,
                message: e.to_string(),
            })
        };

        tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(AgentError::Cancelled { agent: kind }),
            result = call => result,
        }
    }

    /// Hands a finished step to the caller, typing it out first when
    /// streaming.
    async fn deliver<F>(&self, ctx: &RunContext, step: &ReasoningStep, on_event: &mut F) -> Result<(), AgentError>
    where
        F: FnMut(ReasoningEvent) + Send,
    {
        let agent = step.agent;
        if self.config.streaming && !self.config.typing_delay.is_zero() {
            let mut ticker = tokio::time::interval(self.config.typing_delay);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            for ch in step.text.chars() {
                tokio::select! {
                    biased;
                    _ = ctx.cancelled() => return Err(AgentError::Cancelled { agent }),
                    _ = ticker.tick() => {}
                }
                on_event(ReasoningEvent::Typing {
                    agent,
                    delta: ch.to_string(),
                });
            }
        }

        if ctx.is_cancelled() {
            return Err(AgentError::Cancelled { agent });
        }
        on_event(ReasoningEvent::Step { step: step.clone() });
        Ok(())
    }
}

/// The Recommendation agent's output, carrying the SOPs SOPMatch chose.
fn finalize_recommendation(output: AgentOutput, matched_sops: &[String]) -> Recommendation {
    let mut rec = output
        .recommendation
        .unwrap_or_else(|| Recommendation::from_text(output.text, output.confidence));
    if !matched_sops.is_empty() {
        rec.sop_refs = matched_sops.to_vec();
    }
    if rec.sop_reference.is_none() {
        rec.sop_reference = rec.sop_refs.first().cloned();
    }
    rec
}

fn abort(
    err: AgentError,
    partial: Vec<ReasoningStep>,
    mut log: TransparencyLog,
    started: Instant,
    run_id: RunId,
) -> ReasoningFailure {
    if err.is_cancelled() {
        tracing::info!(%run_id, agent = %err.agent(), "Reasoning run cancelled");
    } else {
        tracing::warn!(%run_id, agent = %err.agent(), "Reasoning run aborted: {}", err);
    }
    log.record(
        LogEntry::summary("Reasoning aborted", ORCHESTRATOR_API, LogStatus::Error, started.elapsed())
            .with_detail("completed_steps", partial.len()),
    );
    ReasoningFailure {
        error: err.into(),
        partial,
        log,
    }
}
