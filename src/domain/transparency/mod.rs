//! Transparency log: an append-only record of every check and agent call in
//! a run, with the system consulted and how long it took.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::domain::foundation::{millis, Timestamp};

/// Outcome of a logged action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Pending,
    Success,
    Warning,
    Error,
}

/// Whether an entry records a single unit of work or a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogEntryKind {
    Step,
    Summary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub action: String,
    pub api: String,
    pub status: LogStatus,
    pub timestamp: Timestamp,
    #[serde(with = "millis", rename = "executionTimeMs")]
    pub duration: Duration,
    pub kind: LogEntryKind,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, Value>,
}

impl LogEntry {
    /// Entry for one check or agent call.
    pub fn step(
        action: impl Into<String>,
        api: impl Into<String>,
        status: LogStatus,
        duration: Duration,
    ) -> Self {
        Self {
            action: action.into(),
            api: api.into(),
            status,
            timestamp: Timestamp::now(),
            duration,
            kind: LogEntryKind::Step,
            details: BTreeMap::new(),
        }
    }

    /// Entry closing a run with its total wall-clock duration.
    pub fn summary(
        action: impl Into<String>,
        api: impl Into<String>,
        status: LogStatus,
        duration: Duration,
    ) -> Self {
        Self {
            kind: LogEntryKind::Summary,
            ..Self::step(action, api, status, duration)
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// Ordered log entries for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransparencyLog {
    entries: Vec<LogEntry>,
}

impl TransparencyLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of the durations of the step entries. Never exceeds the summary
    /// duration of the same run.
    pub fn step_duration_total(&self) -> Duration {
        self.entries
            .iter()
            .filter(|e| e.kind == LogEntryKind::Step)
            .map(|e| e.duration)
            .sum()
    }

    /// The entry closing the run, if the run finished.
    pub fn summary(&self) -> Option<&LogEntry> {
        self.entries.iter().rev().find(|e| e.kind == LogEntryKind::Summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_total_excludes_summary() {
        let mut log = TransparencyLog::new();
        log.record(LogEntry::step("a", "Claims Data API", LogStatus::Success, Duration::from_millis(3)));
        log.record(LogEntry::step("b", "Provider Registry", LogStatus::Warning, Duration::from_millis(4)));
        log.record(LogEntry::summary("done", "PreScreeningEngine", LogStatus::Warning, Duration::from_millis(9)));

        assert_eq!(log.step_duration_total(), Duration::from_millis(7));
        assert_eq!(log.summary().map(|e| e.duration), Some(Duration::from_millis(9)));
    }

    #[test]
    fn entry_serializes_execution_time_in_ms() {
        let entry = LogEntry::step("a", "api", LogStatus::Error, Duration::from_micros(1500))
            .with_detail("error", "boom");
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["executionTimeMs"], 1.5);
        assert_eq!(value["status"], "error");
        assert_eq!(value["details"]["error"], "boom");
    }
}
