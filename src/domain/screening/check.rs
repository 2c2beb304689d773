//! Executable checks and the scenario definitions that order them.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::errors::CheckExecutionError;
use super::policy::ScreeningPolicy;
use super::step::{StepResult, StepStatus};
use crate::domain::case::Case;
use crate::domain::sop::{DenialCode, SopDocument};

/// Status a failed check maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn status(&self) -> StepStatus {
        match self {
            Severity::Warning => StepStatus::Warning,
            Severity::Error => StepStatus::Error,
        }
    }
}

/// What a check found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finding {
    /// The case satisfies the check.
    Pass,
    /// Not a failure, but a reviewer should look. Always a warning.
    Advisory,
    /// The case fails the check; mapped through the check's severity.
    Fail,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub finding: Finding,
    pub action: String,
    pub details: BTreeMap<String, Value>,
}

impl CheckOutcome {
    fn with_finding(finding: Finding, action: impl Into<String>) -> Self {
        Self {
            finding,
            action: action.into(),
            details: BTreeMap::new(),
        }
    }

    pub fn pass(action: impl Into<String>) -> Self {
        Self::with_finding(Finding::Pass, action)
    }

    pub fn advisory(action: impl Into<String>) -> Self {
        Self::with_finding(Finding::Advisory, action)
    }

    pub fn fail(action: impl Into<String>) -> Self {
        Self::with_finding(Finding::Fail, action)
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// Inputs visible to a check: the case, the steps before it, and the
/// thresholds of the running policy.
pub struct CheckContext<'a> {
    pub case: &'a Case,
    pub prior: &'a [StepResult],
    pub policy: &'a ScreeningPolicy,
}

impl<'a> CheckContext<'a> {
    /// Earlier step produced by the check with the given id.
    pub fn prior_step(&self, check: &str) -> Option<&'a StepResult> {
        self.prior.iter().find(|s| s.check == check)
    }

    /// Detail recorded by an earlier step.
    pub fn prior_detail(&self, check: &str, key: &str) -> Option<&'a Value> {
        self.prior_step(check).and_then(|s| s.details.get(key))
    }
}

pub type CheckFn =
    Arc<dyn Fn(&CheckContext<'_>) -> Result<CheckOutcome, CheckExecutionError> + Send + Sync>;

/// One ordered check of a scenario.
#[derive(Clone)]
pub struct CheckSpec {
    pub id: String,
    pub title: String,
    /// System consulted, as shown in the transparency log.
    pub api: String,
    pub severity: Severity,
    pub denial_code: Option<DenialCode>,
    predicate: CheckFn,
}

impl CheckSpec {
    /// Creates a check with `Severity::Error` and no denial code.
    pub fn new<F>(id: impl Into<String>, title: impl Into<String>, api: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&CheckContext<'_>) -> Result<CheckOutcome, CheckExecutionError> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            title: title.into(),
            api: api.into(),
            severity: Severity::Error,
            denial_code: None,
            predicate: Arc::new(predicate),
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_denial_code(mut self, code: DenialCode) -> Self {
        self.denial_code = Some(code);
        self
    }

    pub fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckOutcome, CheckExecutionError> {
        (self.predicate)(ctx)
    }
}

impl fmt::Debug for CheckSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckSpec")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("api", &self.api)
            .field("severity", &self.severity)
            .field("denial_code", &self.denial_code)
            .finish()
    }
}

/// An SOP paired with the checks that walk a case through it.
#[derive(Debug, Clone)]
pub struct ScenarioDefinition {
    pub key: String,
    pub sop: SopDocument,
    pub checks: Vec<CheckSpec>,
}

impl ScenarioDefinition {
    pub fn new(key: impl Into<String>, sop: SopDocument, checks: Vec<CheckSpec>) -> Self {
        Self {
            key: key.into(),
            sop,
            checks,
        }
    }

    pub fn title(&self) -> &str {
        &self.sop.title
    }

    pub fn document_references(&self) -> &[String] {
        &self.sop.document_references
    }
}
