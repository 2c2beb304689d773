//! SOP Catalog Port - read-only lookup of scenario definitions.
//!
//! Implementations must be safe for concurrent reads; every run resolves
//! against the same catalog.

use std::sync::Arc;

use crate::domain::case::Case;
use crate::domain::screening::ScenarioDefinition;

pub trait SopCatalog: Send + Sync {
    /// Definition for a scenario key such as `build-days`.
    fn resolve_by_scenario(&self, key: &str) -> Option<Arc<ScenarioDefinition>>;

    /// Definition for a case status such as `Pending Review`.
    fn resolve_by_status(&self, status: &str) -> Option<Arc<ScenarioDefinition>>;

    /// Every definition, statuses first, in catalog order.
    fn all(&self) -> Vec<Arc<ScenarioDefinition>>;

    /// Definition for a code that may name either a status or a scenario.
    /// Statuses are consulted first.
    fn resolve_by_code(&self, code: &str) -> Option<Arc<ScenarioDefinition>> {
        self.resolve_by_status(code)
            .or_else(|| self.resolve_by_scenario(code))
    }

    /// Definitions whose SOP may apply the given denial code.
    fn resolve_by_denial_code(&self, code: &str) -> Vec<Arc<ScenarioDefinition>> {
        self.all()
            .into_iter()
            .filter(|def| def.sop.denial_code(code).is_some())
            .collect()
    }

    /// Definitions whose SOP applies in a state.
    fn by_state(&self, state: &str) -> Vec<Arc<ScenarioDefinition>> {
        self.all()
            .into_iter()
            .filter(|def| def.sop.applies_in(state))
            .collect()
    }

    /// SOPs relevant to a case: its scenario's, then its status's.
    fn applicable_for(&self, case: &Case) -> Vec<Arc<ScenarioDefinition>> {
        let mut found: Vec<Arc<ScenarioDefinition>> = Vec::new();
        let by_scenario = case
            .scenario_key()
            .and_then(|key| self.resolve_by_scenario(&key));
        let by_status = self.resolve_by_status(&case.status);
        for def in by_scenario.into_iter().chain(by_status) {
            if !found.iter().any(|f| f.key == def.key) {
                found.push(def);
            }
        }
        found
    }
}
