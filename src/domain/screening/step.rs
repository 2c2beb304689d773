//! Step results emitted while walking a case through its checks.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::sop::DenialCode;
use crate::domain::transparency::LogStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Success,
    Warning,
    Error,
}

impl StepStatus {
    pub fn log_status(&self) -> LogStatus {
        match self {
            StepStatus::Pending => LogStatus::Pending,
            StepStatus::Success => LogStatus::Success,
            StepStatus::Warning => LogStatus::Warning,
            StepStatus::Error => LogStatus::Error,
        }
    }
}

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    /// 1-based position in the scenario's check order.
    pub step: usize,
    pub check: String,
    pub title: String,
    pub status: StepStatus,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denial_code: Option<DenialCode>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, Value>,
}

impl StepResult {
    pub fn is_error(&self) -> bool {
        self.status == StepStatus::Error
    }

    pub fn is_warning(&self) -> bool {
        self.status == StepStatus::Warning
    }
}

/// Steps and denial codes accumulated so far in a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialResult {
    pub steps: Vec<StepResult>,
    pub denial_codes: Vec<DenialCode>,
}
