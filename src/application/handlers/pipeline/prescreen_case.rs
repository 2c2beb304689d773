//! PrescreenCaseHandler - runs only the rule-based pass.

use std::sync::Arc;

use super::case_source::{CaseSource, PipelineError};
use crate::domain::screening::{PreScreeningEngine, ScreeningResult};
use crate::ports::CaseStore;

pub struct PrescreenCaseHandler {
    store: Arc<dyn CaseStore>,
    engine: PreScreeningEngine,
}

impl PrescreenCaseHandler {
    pub fn new(store: Arc<dyn CaseStore>, engine: PreScreeningEngine) -> Self {
        Self { store, engine }
    }

    pub async fn handle(&self, source: CaseSource) -> Result<ScreeningResult, PipelineError> {
        let case = source.resolve(self.store.as_ref()).await?;
        Ok(self.engine.run(&case, |_| {})?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::case_store::InMemoryCaseStore;
    use crate::adapters::catalog::InMemorySopCatalog;
    use crate::domain::foundation::CaseId;
    use crate::domain::recommendation::Action;

    #[tokio::test]
    async fn prescreens_stored_case() {
        let store = Arc::new(InMemoryCaseStore::seeded().unwrap());
        let engine = PreScreeningEngine::new(Arc::new(InMemorySopCatalog::builtin().unwrap()));
        let handler = PrescreenCaseHandler::new(store, engine);

        let result = handler
            .handle(CaseId::new("CLM-1001").unwrap().into())
            .await
            .unwrap();

        assert_eq!(result.scenario, "build-days");
        assert_eq!(result.action(), Some(Action::Deny));
        assert!(result.denial_codes.iter().any(|c| c.code == "N26"));
    }
}
