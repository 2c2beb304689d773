//! HTTP handlers for case endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::dto::{CaseListResponse, ListCasesQuery};
use crate::adapters::http::error::ApiError;
use crate::adapters::http::state::AppState;
use crate::application::{CaseSource, PipelineError};
use crate::domain::foundation::{CaseId, DomainError};
use crate::ports::CaseFilter;

fn parse_case_id(raw: &str) -> Result<CaseId, ApiError> {
    CaseId::new(raw).map_err(|e| ApiError(DomainError::from(e)))
}

/// GET /api/v1/cases - Filtered, paginated list
pub async fn list_cases(
    State(state): State<AppState>,
    Query(query): Query<ListCasesQuery>,
) -> Result<Response, ApiError> {
    let filter: CaseFilter = query.into();
    let page = state
        .store
        .list(&filter)
        .await
        .map_err(|e| ApiError::from(&PipelineError::from(e)))?;
    Ok((StatusCode::OK, Json(CaseListResponse::from(page))).into_response())
}

/// GET /api/v1/cases/:id - One case
pub async fn get_case(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_case_id(&id)?;
    let case = state
        .store
        .get_by_id(&id)
        .await
        .map_err(|e| ApiError::from(&PipelineError::from(e)))?;
    Ok((StatusCode::OK, Json(case)).into_response())
}

/// POST /api/v1/cases/:id/prescreen - Rule-based pre-screening
pub async fn prescreen_case(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_case_id(&id)?;
    let result = state
        .prescreen
        .handle(CaseSource::Stored(id))
        .await
        .map_err(|e| ApiError::from(&e))?;
    Ok((StatusCode::OK, Json(result)).into_response())
}
