//! HTTP routes for AI endpoints.

use axum::{routing::post, Router};

use super::handlers::{analyze_case, chat};
use crate::adapters::http::state::AppState;

pub fn ai_routes() -> Router<AppState> {
    Router::new()
        .route("/analyze", post(analyze_case))
        .route("/chat", post(chat))
}
