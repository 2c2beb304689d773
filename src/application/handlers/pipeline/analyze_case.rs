//! AnalyzeCaseHandler - the full pipeline for one case.
//!
//! Pre-screening, then the reasoning agents, then reconciliation of the two
//! recommendations. Progress is delivered as `PipelineEvent`s over a bounded
//! channel owned by the returned `RunHandle`. Cancelling or dropping the
//! handle cancels the run; no event is sent after that.

use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::case_source::{CaseSource, PipelineError};
use crate::domain::case::Case;
use crate::domain::foundation::{DomainError, ErrorCode, RunId};
use crate::domain::reasoning::{
    AgentKind, CancelHandle, ReasoningEvent, ReasoningOrchestrator, ReasoningStep, RunContext,
};
use crate::domain::recommendation::Recommendation;
use crate::domain::reconciliation::{Reconciliation, RecommendationReconciler};
use crate::domain::screening::{PartialResult, PreScreeningEngine, ScreeningResult};
use crate::ports::CaseStore;

pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Everything a completed run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub run_id: RunId,
    pub steps: Vec<ReasoningStep>,
    pub recommendation: Recommendation,
    pub pre_screening: ScreeningResult,
    pub agreement: Reconciliation,
}

/// Progress of a pipeline run, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// Pre-screening after one more check.
    Screening { partial: PartialResult },
    /// Next character of a reasoning step being typed out.
    Typing { agent: AgentKind, delta: String },
    /// A complete reasoning step.
    Step { step: ReasoningStep },
    Complete { outcome: Box<AnalysisOutcome> },
    /// The run aborted. Steps delivered so far stay valid.
    Failed {
        code: String,
        message: String,
        partial: Vec<ReasoningStep>,
    },
}

impl From<ReasoningEvent> for PipelineEvent {
    fn from(event: ReasoningEvent) -> Self {
        match event {
            ReasoningEvent::Typing { agent, delta } => PipelineEvent::Typing { agent, delta },
            ReasoningEvent::Step { step } => PipelineEvent::Step { step },
        }
    }
}

/// A running pipeline. Yields events until the run ends.
pub struct RunHandle {
    run_id: RunId,
    events: mpsc::Receiver<PipelineEvent>,
    cancel: CancelHandle,
    task: JoinHandle<()>,
}

impl RunHandle {
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Next event, or `None` once the run ended or was cancelled. Events
    /// still buffered at cancellation are discarded.
    pub async fn next_event(&mut self) -> Option<PipelineEvent> {
        if self.cancel.is_cancelled() {
            self.discard_buffered();
            return None;
        }
        let event = self.events.recv().await;
        if self.cancel.is_cancelled() {
            self.discard_buffered();
            return None;
        }
        event
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    fn discard_buffered(&mut self) {
        self.events.close();
        while self.events.try_recv().is_ok() {}
    }
}

impl Stream for RunHandle {
    type Item = PipelineEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.cancel.is_cancelled() {
            this.discard_buffered();
            return Poll::Ready(None);
        }
        match this.events.poll_recv(cx) {
            Poll::Ready(Some(_)) if this.cancel.is_cancelled() => {
                this.discard_buffered();
                Poll::Ready(None)
            }
            other => other,
        }
    }
}

impl Drop for RunHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[derive(Clone)]
pub struct AnalyzeCaseHandler {
    store: Arc<dyn CaseStore>,
    engine: PreScreeningEngine,
    orchestrator: Arc<ReasoningOrchestrator>,
    reconciler: RecommendationReconciler,
    capacity: usize,
}

impl AnalyzeCaseHandler {
    pub fn new(
        store: Arc<dyn CaseStore>,
        engine: PreScreeningEngine,
        orchestrator: Arc<ReasoningOrchestrator>,
        reconciler: RecommendationReconciler,
    ) -> Self {
        Self {
            store,
            engine,
            orchestrator,
            reconciler,
            capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Resolves the case and starts the run. Errors here mean nothing ran.
    pub async fn start(&self, source: CaseSource) -> Result<RunHandle, PipelineError> {
        let case = source.resolve(self.store.as_ref()).await?;
        let (ctx, cancel) = RunContext::new();
        let (tx, events) = mpsc::channel(self.capacity);
        let run_id = ctx.run_id();

        let pipeline = self.clone();
        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            pipeline.drive(case, ctx, task_cancel, tx).await;
        });

        Ok(RunHandle {
            run_id,
            events,
            cancel,
            task,
        })
    }

    /// Runs to completion and returns the outcome without streaming.
    pub async fn run_to_completion(&self, source: CaseSource) -> Result<AnalysisOutcome, DomainError> {
        let mut handle = self.start(source).await.map_err(|e| DomainError::from(&e))?;
        while let Some(event) = handle.next_event().await {
            match event {
                PipelineEvent::Complete { outcome } => return Ok(*outcome),
                PipelineEvent::Failed { message, .. } => {
                    return Err(DomainError::new(ErrorCode::AgentFailed, message))
                }
                _ => {}
            }
        }
        Err(DomainError::new(ErrorCode::RunCancelled, "Run ended without a result"))
    }

    async fn drive(self, case: Case, ctx: RunContext, cancel: CancelHandle, tx: mpsc::Sender<PipelineEvent>) {
        let run_id = ctx.run_id();
        tracing::info!(%run_id, case_id = %case.id, "Pipeline run started");

        let mut partials = Vec::new();
        let pre_screening = match self.engine.run(&case, |partial| partials.push(partial)) {
            Ok(result) => result,
            Err(err) => {
                let err = PipelineError::from(err);
                let domain = DomainError::from(&err);
                forward(&ctx, &cancel, &tx, failed(&domain, Vec::new())).await;
                return;
            }
        };
        for partial in partials {
            if !forward(&ctx, &cancel, &tx, PipelineEvent::Screening { partial }).await {
                return;
            }
        }

        // The orchestrator's sink is synchronous; events go through an
        // unbounded hop and are forwarded with backpressure from here.
        let (inner_tx, mut inner_rx) = mpsc::unbounded_channel::<PipelineEvent>();
        let reasoning = self.orchestrator.run(&ctx, &case, move |event| {
            let _ = inner_tx.send(event.into());
        });
        let forwarding = async {
            while let Some(event) = inner_rx.recv().await {
                if !forward(&ctx, &cancel, &tx, event).await {
                    break;
                }
            }
        };
        let (reasoning, ()) = tokio::join!(reasoning, forwarding);

        if ctx.is_cancelled() {
            tracing::info!(%run_id, "Pipeline run cancelled");
            return;
        }

        let event = match reasoning {
            Ok(result) => {
                let agreement = self
                    .reconciler
                    .reconcile(&pre_screening.recommendation, &result.recommendation);
                tracing::info!(%run_id, status = ?agreement.status, "Pipeline run finished");
                PipelineEvent::Complete {
                    outcome: Box::new(AnalysisOutcome {
                        run_id,
                        steps: result.steps,
                        recommendation: result.recommendation,
                        pre_screening,
                        agreement,
                    }),
                }
            }
            Err(failure) => {
                let domain = DomainError::from(&failure.error);
                failed(&domain, failure.partial)
            }
        };
        forward(&ctx, &cancel, &tx, event).await;
    }
}

fn failed(error: &DomainError, partial: Vec<ReasoningStep>) -> PipelineEvent {
    PipelineEvent::Failed {
        code: error.code.to_string(),
        message: error.message.clone(),
        partial,
    }
}

/// Sends one event unless the run is cancelled. A closed receiver cancels
/// the run. Returns false when nothing more should be sent.
async fn forward(
    ctx: &RunContext,
    cancel: &CancelHandle,
    tx: &mpsc::Sender<PipelineEvent>,
    event: PipelineEvent,
) -> bool {
    if ctx.is_cancelled() {
        return false;
    }
    tokio::select! {
        biased;
        _ = ctx.cancelled() => false,
        sent = tx.send(event) => {
            if sent.is_err() {
                cancel.cancel();
                return false;
            }
            true
        }
    }
}
