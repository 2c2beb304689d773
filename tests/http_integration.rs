//! HTTP surface driven through the router with `oneshot`.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use case_reasoning::adapters::ai::{MockAIProvider, MockError};
use case_reasoning::adapters::http::ai::{AnalyzeFrame, ChatFrame};
use case_reasoning::adapters::http::{api_router, AppState, EngineParts, HttpSettings, SseDecoder};
use case_reasoning::adapters::{InMemoryCaseStore, InMemorySopCatalog};

fn app_with(provider: MockAIProvider) -> Router {
    let parts = EngineParts::new(
        Arc::new(InMemoryCaseStore::seeded().unwrap()),
        Arc::new(InMemorySopCatalog::builtin().unwrap()),
        Arc::new(provider),
    );
    api_router(AppState::build(parts).unwrap(), &HttpSettings::default())
}

fn app() -> Router {
    app_with(MockAIProvider::demo())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, req).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_is_ok() {
    let (status, body) = send_json(app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "case-reasoning");
}

#[tokio::test]
async fn list_cases_paginates_with_camel_case_page_size() {
    let (status, body) = send_json(app(), get("/api/v1/cases?page=2&pageSize=4")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 9);
    assert_eq!(body["page"], 2);
    assert_eq!(body["pageSize"], 4);
    assert_eq!(body["totalPages"], 3);
    assert_eq!(body["cases"][0]["id"], "CLM-1005");
}

#[tokio::test]
async fn list_cases_with_huge_page_is_empty() {
    let uri = format!("/api/v1/cases?page={}&pageSize=100", usize::MAX);
    let (status, body) = send_json(app(), get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 9);
    assert!(body["cases"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn list_cases_searches_member_names() {
    let (_, body) = send_json(app(), get("/api/v1/cases?search=john%20doe")).await;
    let ids: Vec<&str> = body["cases"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["CLM-1001"]);
}

#[tokio::test]
async fn unknown_case_is_404_with_code() {
    let (status, body) = send_json(app(), get("/api/v1/cases/CLM-404")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "CASE_NOT_FOUND");
}

#[tokio::test]
async fn prescreen_denies_build_days_case() {
    let (status, body) =
        send_json(app(), post("/api/v1/cases/CLM-1001/prescreen", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recommendation"]["action"], "DENY");
    assert!(body["recommendation"]["reason"].as_str().unwrap().contains("N26"));
    assert!(body["denialCodes"]
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c["code"] == "N26"));
}

#[tokio::test]
async fn analyze_streams_steps_then_complete() {
    let (status, bytes) = send(app(), post("/api/v1/ai/analyze", json!({ "caseId": "CLM-1001" }))).await;
    assert_eq!(status, StatusCode::OK);

    let frames = SseDecoder::<AnalyzeFrame>::new().push(&bytes);
    let steps = frames
        .iter()
        .filter(|f| matches!(f, AnalyzeFrame::Step { .. }))
        .count();
    assert_eq!(steps, 4);

    let Some(AnalyzeFrame::Complete { result }) = frames.last() else {
        panic!("expected complete frame, got {:?}", frames.last());
    };
    assert_eq!(result.steps.len(), 4);
    let agreement = serde_json::to_value(&result.agreement).unwrap();
    assert_eq!(agreement["status"], "disagree");
    assert_eq!(agreement["ruleBasedAction"], "DENY");
}

#[tokio::test]
async fn analyze_reports_agent_failure_as_error_frame() {
    let provider = MockAIProvider::new()
        .with_response("Record complete.")
        .with_error(MockError::Unavailable {
            message: "model offline".to_string(),
        });
    let (status, bytes) = send(
        app_with(provider),
        post("/api/v1/ai/analyze", json!({ "caseId": "CLM-1001" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let frames = SseDecoder::<AnalyzeFrame>::new().push(&bytes);
    assert!(matches!(frames.first(), Some(AnalyzeFrame::Step { .. })));
    match frames.last() {
        Some(AnalyzeFrame::Error { error }) => assert!(error.contains("model offline")),
        other => panic!("expected error frame, got {:?}", other),
    }
}

#[tokio::test]
async fn analyze_without_case_is_400() {
    let (status, body) = send_json(app(), post("/api/v1/ai/analyze", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn analyze_accepts_inline_case() {
    let case = json!({ "id": "INLINE-7", "status": "Information Needed", "amount": 90.0 });
    let (status, bytes) = send(app(), post("/api/v1/ai/analyze", json!({ "case": case }))).await;
    assert_eq!(status, StatusCode::OK);

    let frames = SseDecoder::<AnalyzeFrame>::new().push(&bytes);
    match frames.last() {
        Some(AnalyzeFrame::Complete { result }) => {
            assert_eq!(result.pre_screening.case_id.as_str(), "INLINE-7")
        }
        other => panic!("expected complete frame, got {:?}", other),
    }
}

#[tokio::test]
async fn chat_streams_tokens_that_join_to_the_response() {
    let provider = MockAIProvider::new().with_response("Check SOP 3.1 and Page 9 first.");
    let request = post(
        "/api/v1/ai/chat",
        json!({
            "message": "Which SOP applies?",
            "caseId": "CLM-1001",
            "conversationHistory": [{ "role": "user", "content": "Hello" }]
        }),
    );
    let (status, bytes) = send(app_with(provider), request).await;
    assert_eq!(status, StatusCode::OK);

    let frames = SseDecoder::<ChatFrame>::new().push(&bytes);
    let tokens: String = frames
        .iter()
        .filter_map(|f| match f {
            ChatFrame::Token { token } => Some(token.as_str()),
            _ => None,
        })
        .collect();
    let Some(ChatFrame::Complete { result }) = frames.last() else {
        panic!("expected complete frame, got {:?}", frames.last());
    };
    assert_eq!(tokens, result.response);
    assert_eq!(result.suggestions.len(), 3);
    let refs = serde_json::to_value(&result.sop_references).unwrap();
    assert_eq!(refs, json!([{ "title": "SOP 3.1" }, { "page": "Page 9" }]));
}

#[tokio::test]
async fn chat_failure_streams_error_with_apology() {
    let provider = MockAIProvider::new().with_error(MockError::AuthenticationFailed);
    let (_, bytes) = send(
        app_with(provider),
        post("/api/v1/ai/chat", json!({ "message": "Hi" })),
    )
    .await;

    let frames = SseDecoder::<ChatFrame>::new().push(&bytes);
    match frames.as_slice() {
        [ChatFrame::Error { error, fallback: Some(apology) }] => {
            assert_eq!(error, "authentication failed");
            assert!(apology.response.starts_with("I apologize, but I encountered an error"));
        }
        other => panic!("expected a single error frame, got {:?}", other),
    }
}

#[tokio::test]
async fn chat_requires_a_message() {
    let (status, body) = send_json(app(), post("/api/v1/ai/chat", json!({ "message": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Message is required");
}

#[tokio::test]
async fn reconcile_reads_action_from_ai_prose() {
    let request = post(
        "/api/v1/reconcile",
        json!({
            "ruleBased": { "action": "APPROVE", "reason": "All checks passed", "confidence": 0.9 },
            "ai": { "reason": "The claim should be denied due to missing authorization" }
        }),
    );
    let (status, body) = send_json(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "disagree");
    assert_eq!(body["ruleBasedAction"], "APPROVE");
    assert_eq!(body["aiAction"], "DENY");
}
