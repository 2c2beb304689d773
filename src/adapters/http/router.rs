//! Top-level router: health, versioned API and middleware.

use axum::{
    routing::{get, post},
    Json, Router,
};
use http::{header::HeaderName, HeaderValue, Method};
use serde::Serialize;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::ai::{ai_routes, reconcile};
use super::cases::case_routes;
use super::state::AppState;

pub const SERVICE_NAME: &str = env!("CARGO_PKG_NAME");
const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Allowed origins; `*` or an empty list allows any.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin {}: {}", o, e);
                None
            }
        })
        .collect();
    base.allow_origin(parsed)
}

/// Transport settings for the router.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpSettings {
    /// Allowed CORS origins; empty allows any.
    pub cors_origins: Vec<String>,
    /// Bounds time to the response head. Streamed bodies run until the
    /// stream ends.
    pub request_timeout: Duration,
    /// Interval between SSE keep-alive comments.
    pub keep_alive: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            request_timeout: Duration::from_secs(30),
            keep_alive: Duration::from_secs(15),
        }
    }
}

/// Builds the application router.
pub fn api_router(mut state: AppState, settings: &HttpSettings) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    state.keep_alive = settings.keep_alive;

    let api = Router::new()
        .nest("/cases", case_routes())
        .nest("/ai", ai_routes())
        .route("/reconcile", post(reconcile));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        .layer(TimeoutLayer::new(settings.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(cors_layer(&settings.cors_origins))
        .with_state(state)
}
