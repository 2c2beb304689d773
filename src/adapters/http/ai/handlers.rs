//! HTTP handlers for AI endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::{Stream, StreamExt};
use std::convert::Infallible;

use super::dto::{
    AnalysisResultDto, AnalyzeFrame, AnalyzeRequest, ChatFrame, ChatRequest, ChatResultDto,
    ReconcileRequest,
};
use crate::adapters::http::error::ApiError;
use crate::adapters::http::sse::to_event;
use crate::adapters::http::state::AppState;
use crate::application::{AskQuestionCommand, ChatEvent, ChatStream, PipelineEvent, RunHandle};
use crate::domain::chat::ChatError;
use crate::domain::foundation::DomainError;

// ════════════════════════════════════════════════════════════════════════════
// Frame mapping
// ════════════════════════════════════════════════════════════════════════════

/// Screening progress and typing deltas stay server-side; the wire carries
/// whole steps only.
fn analyze_frame(event: PipelineEvent) -> Option<AnalyzeFrame> {
    match event {
        PipelineEvent::Screening { .. } | PipelineEvent::Typing { .. } => None,
        PipelineEvent::Step { step } => Some(AnalyzeFrame::Step { step }),
        PipelineEvent::Complete { outcome } => Some(AnalyzeFrame::Complete {
            result: Box::new(AnalysisResultDto::from(*outcome)),
        }),
        PipelineEvent::Failed { message, .. } => Some(AnalyzeFrame::Error { error: message }),
    }
}

fn chat_frame(event: ChatEvent) -> ChatFrame {
    match event {
        ChatEvent::Token { delta } => ChatFrame::Token { token: delta },
        ChatEvent::Complete { message } => ChatFrame::Complete {
            result: ChatResultDto::from(message),
        },
        ChatEvent::Failed { message, error } => ChatFrame::Error {
            error,
            fallback: Some(ChatResultDto::from(message)),
        },
    }
}

/// Dropping the returned stream drops the run handle, which cancels the run.
fn analysis_events(run: RunHandle) -> impl Stream<Item = Result<Event, Infallible>> {
    run.filter_map(|event| async move { analyze_frame(event).map(|f| Ok(to_event(&f))) })
}

fn chat_events(stream: ChatStream) -> impl Stream<Item = Result<Event, Infallible>> {
    stream.map(|event| Ok(to_event(&chat_frame(event))))
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/v1/ai/analyze - Stream the reasoning trace for a case
pub async fn analyze_case(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Response, ApiError> {
    let source = req
        .case
        .into_source()?
        .ok_or_else(|| ApiError::bad_request("Case ID or case data is required"))?;
    let run = state.analyze.start(source).await.map_err(|e| ApiError::from(&e))?;
    tracing::info!("Streaming analysis run {}", run.run_id());

    Ok(Sse::new(analysis_events(run))
        .keep_alive(KeepAlive::new().interval(state.keep_alive))
        .into_response())
}

/// POST /api/v1/ai/chat - Stream an answer about a case
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    if req.message.trim().is_empty() {
        return Err(ApiError(DomainError::from(&ChatError::EmptyQuestion)));
    }

    let mut cmd = AskQuestionCommand::new(req.message)
        .with_history(req.conversation_history.into_iter().map(Into::into).collect())
        .with_steps(req.reasoning_steps);
    if let Some(source) = req.case.into_source()? {
        cmd = cmd.about(source);
    }

    let stream = state.chat.stream(cmd).await.map_err(|e| ApiError::from(&e))?;
    Ok(Sse::new(chat_events(stream))
        .keep_alive(KeepAlive::new().interval(state.keep_alive))
        .into_response())
}

/// POST /api/v1/reconcile - Compare a rule-based and an AI recommendation
pub async fn reconcile(
    State(state): State<AppState>,
    Json(req): Json<ReconcileRequest>,
) -> Response {
    let result = state.reconciler.reconcile(&req.rule_based, &req.ai);
    (StatusCode::OK, Json(result)).into_response()
}
