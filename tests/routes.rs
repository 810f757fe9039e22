use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use hyperlocal::config::Config;
use hyperlocal::routes;
use hyperlocal::service::{QueryOutcome, QueryService};
use hyperlocal::state::AppState;

/// Scripted orchestrator standing in for the real pipeline.
struct StubService {
    ready: bool,
    outcome: QueryOutcome,
    ensure_calls: AtomicUsize,
    query_calls: AtomicUsize,
}

impl StubService {
    fn new(ready: bool, outcome: QueryOutcome) -> Self {
        StubService {
            ready,
            outcome,
            ensure_calls: AtomicUsize::new(0),
            query_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl QueryService for StubService {
    async fn ensure_ready(&self) -> bool {
        self.ensure_calls.fetch_add(1, Ordering::SeqCst);
        self.ready
    }

    async fn process_query(&self, _message: &str, _session_id: Option<&str>) -> QueryOutcome {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

fn test_config() -> Config {
    Config {
        api_key: "test-key".to_string(),
        api_endpoint: "http://localhost/v1/chat/completions".to_string(),
        model: "gpt-4o-mini".to_string(),
        bind_address: "127.0.0.1:0".to_string(),
        log_level: "info".to_string(),
        coming_soon: false,
        password_protected: false,
        jury_password: None,
        mcp_command: "true".to_string(),
        mcp_args: Vec::new(),
        brightdata_api_key: String::new(),
        web_unlocker_zone: "mcp_unlocker".to_string(),
        browser_auth: String::new(),
        tool_timeout: 5,
        max_agent_steps: 4,
    }
}

fn app_with(config: Config, service: Arc<StubService>) -> Router {
    routes::build(AppState {
        config: Arc::new(config),
        service,
    })
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_chat_empty_body_is_bad_request() {
    let service = Arc::new(StubService::new(true, QueryOutcome::Answer("ok".into())));
    let app = app_with(test_config(), service.clone());

    let request = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].is_string());
    assert_eq!(service.query_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_chat_missing_message_field_is_bad_request() {
    let service = Arc::new(StubService::new(true, QueryOutcome::Answer("ok".into())));
    let app = app_with(test_config(), service);

    let response = app
        .oneshot(post_json("/api/chat", json!({ "sessionId": "session_1" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Message is required");
}

#[tokio::test]
async fn test_chat_unavailable_service_is_503_after_one_init_attempt() {
    let service = Arc::new(StubService::new(false, QueryOutcome::Answer("ok".into())));
    let app = app_with(test_config(), service.clone());

    let response = app
        .oneshot(post_json("/api/chat", json!({ "message": "test" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("not available"));
    assert_eq!(service.ensure_calls.load(Ordering::SeqCst), 1);
    assert_eq!(service.query_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_chat_pipeline_error_is_http_200_error_payload() {
    let service = Arc::new(StubService::new(true, QueryOutcome::Error("x".into())));
    let app = app_with(test_config(), service);

    let response = app
        .oneshot(post_json("/api/chat", json!({ "message": "test" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["type"], "error");
    assert_eq!(body["error"], "x");
}

#[tokio::test]
async fn test_chat_answer_is_result_payload() {
    let service = Arc::new(StubService::new(
        true,
        QueryOutcome::Answer("All clear in Paris today.".into()),
    ));
    let app = app_with(test_config(), service);

    let response = app
        .oneshot(post_json(
            "/api/chat",
            json!({ "message": "Any road closed in Paris?", "sessionId": "session_1" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["type"], "result");
    assert_eq!(body["content"], "All clear in Paris today.");
}

#[tokio::test]
async fn test_verify_password_correct() {
    let mut config = test_config();
    config.jury_password = Some("open-sesame".to_string());
    let service = Arc::new(StubService::new(true, QueryOutcome::Answer("ok".into())));
    let app = app_with(config, service);

    let response = app
        .oneshot(post_json(
            "/api/verify-password",
            json!({ "password": "open-sesame" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert!(body.get("message").is_none());
}

#[tokio::test]
async fn test_verify_password_incorrect() {
    let mut config = test_config();
    config.jury_password = Some("open-sesame".to_string());
    let service = Arc::new(StubService::new(true, QueryOutcome::Answer("ok".into())));
    let app = app_with(config, service);

    let response = app
        .oneshot(post_json(
            "/api/verify-password",
            json!({ "password": "wrong" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Incorrect password");
}

#[tokio::test]
async fn test_verify_password_never_matches_without_secret() {
    // No JURY_PASSWORD configured: the gate must not unlock.
    let service = Arc::new(StubService::new(true, QueryOutcome::Answer("ok".into())));
    let app = app_with(test_config(), service);

    let response = app
        .oneshot(post_json("/api/verify-password", json!({ "password": "" })))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_verify_password_malformed_body_is_500() {
    let service = Arc::new(StubService::new(true, QueryOutcome::Answer("ok".into())));
    let app = app_with(test_config(), service);

    let request = Request::builder()
        .method("POST")
        .uri("/api/verify-password")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_ui_config_without_password_gate() {
    let service = Arc::new(StubService::new(true, QueryOutcome::Answer("ok".into())));
    let app = app_with(test_config(), service);

    let request = Request::builder()
        .uri("/api/ui-config")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["password_protected"], false);
    assert!(body.get("password_notice").is_none());
    assert_eq!(body["loading_stages"].as_array().unwrap().len(), 7);
    assert_eq!(body["welcome"]["sender"], "ai");
    assert_eq!(body["welcome"]["extra"]["kind"], "quick_actions");
}

#[tokio::test]
async fn test_ui_config_with_password_gate() {
    let mut config = test_config();
    config.password_protected = true;
    let service = Arc::new(StubService::new(true, QueryOutcome::Answer("ok".into())));
    let app = app_with(config, service);

    let request = Request::builder()
        .uri("/api/ui-config")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    let body = body_json(response).await;
    assert_eq!(body["password_protected"], true);
    assert_eq!(body["password_notice"]["sender"], "system");
}

#[tokio::test]
async fn test_index_serves_chat_ui() {
    let service = Arc::new(StubService::new(true, QueryOutcome::Answer("ok".into())));
    let app = app_with(test_config(), service);

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("/api/chat"));
}

#[tokio::test]
async fn test_index_serves_coming_soon_when_flagged() {
    let mut config = test_config();
    config.coming_soon = true;
    let service = Arc::new(StubService::new(true, QueryOutcome::Answer("ok".into())));
    let app = app_with(config, service);

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Coming Soon"));
}
