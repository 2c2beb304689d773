//! Shared state for all HTTP handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::adapters::ai::{default_roster, AgentSettings};
use crate::application::{AnalyzeCaseHandler, AskQuestionHandler, PrescreenCaseHandler};
use crate::domain::chat::{ChatAssistant, ChatConfig};
use crate::domain::foundation::ValidationError;
use crate::domain::reasoning::{ReasoningOrchestrator, RunConfig};
use crate::domain::reconciliation::RecommendationReconciler;
use crate::domain::screening::{PreScreeningEngine, ScreeningPolicy};
use crate::ports::{AIProvider, CaseStore, SopCatalog};

const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(15);

/// Collaborators the engine is built from.
pub struct EngineParts {
    pub store: Arc<dyn CaseStore>,
    pub catalog: Arc<dyn SopCatalog>,
    pub provider: Arc<dyn AIProvider>,
    pub policy: ScreeningPolicy,
    pub run_config: RunConfig,
    pub agents: AgentSettings,
    pub chat: ChatConfig,
}

impl EngineParts {
    /// Default policies around the given adapters.
    pub fn new(
        store: Arc<dyn CaseStore>,
        catalog: Arc<dyn SopCatalog>,
        provider: Arc<dyn AIProvider>,
    ) -> Self {
        Self {
            store,
            catalog,
            provider,
            policy: ScreeningPolicy::default(),
            run_config: RunConfig::default(),
            agents: AgentSettings::default(),
            chat: ChatConfig::default(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CaseStore>,
    pub prescreen: Arc<PrescreenCaseHandler>,
    pub analyze: Arc<AnalyzeCaseHandler>,
    pub chat: Arc<AskQuestionHandler>,
    pub reconciler: RecommendationReconciler,
    /// SSE keep-alive interval, set by the router.
    pub keep_alive: Duration,
}

impl AppState {
    pub fn build(parts: EngineParts) -> Result<Self, ValidationError> {
        let engine = PreScreeningEngine::new(parts.catalog.clone()).with_policy(parts.policy);
        let roster = default_roster(parts.provider.clone(), parts.agents)?;
        let orchestrator = Arc::new(ReasoningOrchestrator::new(
            roster,
            parts.catalog,
            parts.run_config,
        ));
        let reconciler = RecommendationReconciler::default();
        let assistant =
            Arc::new(ChatAssistant::new(parts.provider).with_config(parts.chat));

        Ok(Self {
            prescreen: Arc::new(PrescreenCaseHandler::new(parts.store.clone(), engine.clone())),
            analyze: Arc::new(AnalyzeCaseHandler::new(
                parts.store.clone(),
                engine,
                orchestrator,
                reconciler.clone(),
            )),
            chat: Arc::new(AskQuestionHandler::new(parts.store.clone(), assistant)),
            store: parts.store,
            reconciler,
            keep_alive: DEFAULT_KEEP_ALIVE,
        })
    }
}
