//! PreScreeningEngine - deterministic rule-based first pass over a case.
//!
//! Walks a case through the ordered checks of its scenario, reporting the
//! accumulated partial result after every step. Check failures of any kind
//! become error steps; only an invalid case stops a run, and then before the
//! first check.

use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::check::{CheckContext, CheckOutcome, CheckSpec, Finding, ScenarioDefinition};
use super::checks::generic_definition;
use super::errors::{CheckExecutionError, ScreeningError};
use super::policy::ScreeningPolicy;
use super::step::{PartialResult, StepResult, StepStatus};
use crate::domain::case::Case;
use crate::domain::foundation::{millis, CaseId};
use crate::domain::recommendation::{Action, Recommendation};
use crate::domain::sop::DenialCode;
use crate::domain::transparency::{LogEntry, LogStatus, TransparencyLog};
use crate::ports::SopCatalog;

const ENGINE_API: &str = "PreScreeningEngine";

/// Final output of a pre-screening run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningResult {
    pub case_id: CaseId,
    pub scenario: String,
    pub scenario_title: String,
    /// True when the case's own scenario did not resolve and a status or
    /// generic sequence ran instead.
    pub fallback: bool,
    pub steps: Vec<StepResult>,
    pub denial_codes: Vec<DenialCode>,
    pub recommendation: Recommendation,
    pub log: TransparencyLog,
    pub document_references: Vec<String>,
    pub completed: bool,
    #[serde(with = "millis", rename = "totalTimeMs")]
    pub total_time: Duration,
}

impl ScreeningResult {
    pub fn action(&self) -> Option<Action> {
        self.recommendation.structured_action()
    }
}

/// Rule engine over an injected, read-only SOP catalog.
#[derive(Clone)]
pub struct PreScreeningEngine {
    catalog: Arc<dyn SopCatalog>,
    policy: ScreeningPolicy,
}

impl PreScreeningEngine {
    pub fn new(catalog: Arc<dyn SopCatalog>) -> Self {
        Self {
            catalog,
            policy: ScreeningPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ScreeningPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &ScreeningPolicy {
        &self.policy
    }

    /// Resolves the definition a case runs under.
    ///
    /// Scenario first, then status, then the generic sequence. The flag is
    /// true when the case's scenario did not resolve.
    pub fn resolve(&self, case: &Case) -> (Arc<ScenarioDefinition>, bool) {
        let scenario_key = case.scenario_key();
        if let Some(def) = scenario_key
            .as_deref()
            .and_then(|key| self.catalog.resolve_by_scenario(key))
        {
            return (def, false);
        }
        let definition = self
            .catalog
            .resolve_by_status(&case.status)
            .unwrap_or_else(|| Arc::new(generic_definition()));
        (definition, true)
    }

    /// Runs every check of the case's scenario in order.
    ///
    /// `on_update` receives the accumulated partial result after each step;
    /// the i-th call carries exactly i steps.
    pub fn run<F>(&self, case: &Case, mut on_update: F) -> Result<ScreeningResult, ScreeningError>
    where
        F: FnMut(PartialResult),
    {
        case.validate()?;

        let started = Instant::now();
        let (definition, fallback) = self.resolve(case);
        tracing::info!(
            case_id = %case.id,
            scenario = %definition.key,
            fallback,
            checks = definition.checks.len(),
            "Pre-screening started"
        );

        let mut steps: Vec<StepResult> = Vec::with_capacity(definition.checks.len());
        let mut denial_codes: Vec<DenialCode> = Vec::new();
        let mut log = TransparencyLog::new();

        for (index, spec) in definition.checks.iter().enumerate() {
            let check_started = Instant::now();
            let evaluated = {
                let ctx = CheckContext {
                    case,
                    prior: &steps,
                    policy: &self.policy,
                };
                evaluate_guarded(spec, &ctx)
            };
            let elapsed = check_started.elapsed();

            let step = match evaluated {
                Ok(outcome) => step_from_outcome(index + 1, spec, outcome),
                Err(err) => {
                    tracing::warn!(case_id = %case.id, check = %spec.id, "Check execution failed: {}", err);
                    step_from_error(index + 1, spec, &err)
                }
            };
            tracing::debug!(case_id = %case.id, check = %spec.id, status = ?step.status, "Check evaluated");

            if let Some(code) = &step.denial_code {
                if !denial_codes.iter().any(|c| c.code == code.code) {
                    denial_codes.push(code.clone());
                }
            }

            let mut entry = LogEntry::step(&step.title, &spec.api, step.status.log_status(), elapsed);
            if let Some(error) = step.details.get("error") {
                entry = entry.with_detail("error", error.clone());
            }
            log.record(entry);
            steps.push(step);

            on_update(PartialResult {
                steps: steps.clone(),
                denial_codes: denial_codes.clone(),
            });
        }

        let mut recommendation = self.policy.recommend(&steps);
        if definition.key != super::checks::GENERIC_SCENARIO {
            recommendation = recommendation.with_sop_reference(definition.sop.reference());
        }

        let total_time = started.elapsed();
        let summary_status = match recommendation.structured_action() {
            Some(Action::Deny) => LogStatus::Error,
            Some(Action::Review) => LogStatus::Warning,
            _ => LogStatus::Success,
        };
        log.record(
            LogEntry::summary("Pre-screening complete", ENGINE_API, summary_status, total_time)
                .with_detail("steps", steps.len())
                .with_detail("denial_codes", denial_codes.len()),
        );

        tracing::info!(
            case_id = %case.id,
            action = ?recommendation.structured_action(),
            denial_codes = denial_codes.len(),
            "Pre-screening finished"
        );

        Ok(ScreeningResult {
            case_id: case.id.clone(),
            scenario: definition.key.clone(),
            scenario_title: definition.title().to_string(),
            fallback,
            steps,
            denial_codes,
            recommendation,
            log,
            document_references: definition.document_references().to_vec(),
            completed: true,
            total_time,
        })
    }
}

/// Evaluates a check, turning a panic inside it into an execution error.
fn evaluate_guarded(spec: &CheckSpec, ctx: &CheckContext<'_>) -> Result<CheckOutcome, CheckExecutionError> {
    match panic::catch_unwind(AssertUnwindSafe(|| spec.evaluate(ctx))) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(CheckExecutionError::Panicked {
                check: spec.title.clone(),
                message,
            })
        }
    }
}

fn step_from_outcome(step: usize, spec: &CheckSpec, outcome: CheckOutcome) -> StepResult {
    let status = match outcome.finding {
        Finding::Pass => StepStatus::Success,
        Finding::Advisory => StepStatus::Warning,
        Finding::Fail => spec.severity.status(),
    };
    let denial_code = match outcome.finding {
        Finding::Fail => spec.denial_code.clone(),
        _ => None,
    };
    let action = match &denial_code {
        Some(code) if !outcome.action.contains(&code.code) => {
            format!("{} ({})", outcome.action, code.code)
        }
        _ => outcome.action,
    };
    StepResult {
        step,
        check: spec.id.clone(),
        title: spec.title.clone(),
        status,
        action,
        denial_code,
        details: outcome.details,
    }
}

fn step_from_error(step: usize, spec: &CheckSpec, err: &CheckExecutionError) -> StepResult {
    let mut details = std::collections::BTreeMap::new();
    details.insert("error".to_string(), serde_json::Value::String(err.message().to_string()));
    StepResult {
        step,
        check: spec.id.clone(),
        title: spec.title.clone(),
        status: StepStatus::Error,
        action: format!("{} could not be completed", spec.title),
        denial_code: None,
        details,
    }
}
