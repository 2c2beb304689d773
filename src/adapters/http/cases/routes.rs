//! HTTP routes for case endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{get_case, list_cases, prescreen_case};
use crate::adapters::http::state::AppState;

pub fn case_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cases))
        .route("/:id", get(get_case))
        .route("/:id/prescreen", post(prescreen_case))
}
