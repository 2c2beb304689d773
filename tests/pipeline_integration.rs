//! End-to-end pipeline runs against the built-in catalog and sample cases.

use std::sync::Arc;
use std::time::Duration;

use case_reasoning::adapters::ai::{default_roster, AgentSettings, MockAIProvider};
use case_reasoning::adapters::{InMemoryCaseStore, InMemorySopCatalog};
use case_reasoning::application::{AnalyzeCaseHandler, CaseSource, PipelineEvent};
use case_reasoning::domain::case::Case;
use case_reasoning::domain::foundation::CaseId;
use case_reasoning::domain::reasoning::{AgentKind, ReasoningOrchestrator, RunConfig};
use case_reasoning::domain::recommendation::Action;
use case_reasoning::domain::reconciliation::{AgreementStatus, RecommendationReconciler};
use case_reasoning::domain::screening::PreScreeningEngine;
use case_reasoning::ports::SopCatalog;

fn handler(provider: MockAIProvider, config: RunConfig) -> AnalyzeCaseHandler {
    let catalog: Arc<dyn SopCatalog> = Arc::new(InMemorySopCatalog::builtin().unwrap());
    let roster = default_roster(Arc::new(provider), AgentSettings::default()).unwrap();
    AnalyzeCaseHandler::new(
        Arc::new(InMemoryCaseStore::seeded().unwrap()),
        PreScreeningEngine::new(catalog.clone()),
        Arc::new(ReasoningOrchestrator::new(roster, catalog, config)),
        RecommendationReconciler::default(),
    )
}

fn stored(id: &str) -> CaseSource {
    CaseId::new(id).unwrap().into()
}

#[tokio::test]
async fn build_days_case_is_denied_and_demo_agents_disagree() {
    let outcome = handler(MockAIProvider::demo(), RunConfig::direct())
        .run_to_completion(stored("CLM-1001"))
        .await
        .unwrap();

    let screening = &outcome.pre_screening;
    assert_eq!(screening.action(), Some(Action::Deny));
    assert!(screening.denial_codes.iter().any(|c| c.code == "N26"));
    assert!(screening.recommendation.reason.contains("N26"));

    let agents: Vec<AgentKind> = outcome.steps.iter().map(|s| s.agent).collect();
    assert_eq!(agents, AgentKind::ORDER.to_vec());
    assert_eq!(outcome.recommendation.structured_action(), Some(Action::Review));

    assert_eq!(outcome.agreement.status, AgreementStatus::Disagree);
    assert_eq!(outcome.agreement.rule_based_action, Some(Action::Deny));
    assert_eq!(outcome.agreement.ai_action, Some(Action::Review));
}

#[tokio::test]
async fn clean_case_is_approved_and_agrees_with_approving_agent() {
    let provider = MockAIProvider::new()
        .with_response("Record complete.")
        .with_response("SOP 2.7 governs cases under process.")
        .with_response("Low risk.")
        .with_response("ACTION: APPROVE\nDocumentation is complete.");

    let outcome = handler(provider, RunConfig::direct())
        .run_to_completion(stored("CLM-1007"))
        .await
        .unwrap();

    assert_eq!(outcome.pre_screening.action(), Some(Action::Approve));
    assert_eq!(outcome.pre_screening.recommendation.confidence.value(), 0.9);
    assert!(outcome.pre_screening.denial_codes.is_empty());
    assert_eq!(outcome.agreement.status, AgreementStatus::Agree);
}

#[tokio::test]
async fn inline_case_runs_without_the_store() {
    let case = Case::new(CaseId::new("INLINE-1").unwrap(), "Pending Review")
        .with_amount(120.0);

    let outcome = handler(MockAIProvider::demo(), RunConfig::direct())
        .run_to_completion(case.into())
        .await
        .unwrap();

    assert_eq!(outcome.pre_screening.case_id.as_str(), "INLINE-1");
    assert_eq!(outcome.steps.len(), 4);
}

#[tokio::test]
async fn screening_updates_grow_one_step_at_a_time() {
    let mut run = handler(MockAIProvider::demo(), RunConfig::direct())
        .start(stored("CLM-1001"))
        .await
        .unwrap();

    let mut counts = Vec::new();
    while let Some(event) = run.next_event().await {
        if let PipelineEvent::Screening { partial } = event {
            counts.push(partial.steps.len());
        }
    }

    let expected: Vec<usize> = (1..=counts.len()).collect();
    assert!(!counts.is_empty());
    assert_eq!(counts, expected);
}

#[tokio::test(start_paused = true)]
async fn streamed_run_types_each_step_before_delivering_it() {
    let mut run = handler(
        MockAIProvider::demo(),
        RunConfig::streamed(Duration::from_millis(1)),
    )
    .start(stored("CLM-1007"))
    .await
    .unwrap();

    let mut typed = String::new();
    let mut first_step_text = None;
    while let Some(event) = run.next_event().await {
        match event {
            PipelineEvent::Typing { agent: AgentKind::Analysis, delta } => typed.push_str(&delta),
            PipelineEvent::Step { step } if first_step_text.is_none() => {
                first_step_text = Some(step.text);
            }
            _ => {}
        }
    }

    assert_eq!(Some(typed), first_step_text);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_cancels_the_run() {
    let provider = MockAIProvider::demo().with_delay(Duration::from_millis(200));
    let calls = Arc::new(provider);
    let roster = default_roster(calls.clone(), AgentSettings::default()).unwrap();
    let catalog: Arc<dyn SopCatalog> = Arc::new(InMemorySopCatalog::builtin().unwrap());
    let handler = AnalyzeCaseHandler::new(
        Arc::new(InMemoryCaseStore::seeded().unwrap()),
        PreScreeningEngine::new(catalog.clone()),
        Arc::new(ReasoningOrchestrator::new(roster, catalog, RunConfig::direct())),
        RecommendationReconciler::default(),
    );

    let mut run = handler.start(stored("CLM-1001")).await.unwrap();
    while let Some(event) = run.next_event().await {
        if matches!(event, PipelineEvent::Step { .. }) {
            break;
        }
    }
    drop(run);

    let after_drop = calls.call_count();
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert!(after_drop < 4);
    assert_eq!(calls.call_count(), after_drop);
}
