#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tokio::sync::Notify;
use tower::ServiceExt;

use promptory_api::config::ServerConfig;
use promptory_api::router::build_app_router;
use promptory_api::sessions::SessionRegistry;
use promptory_api::state::AppState;
use promptory_core::interpret::WebhookResponse;
use promptory_core::model_choice::ModelChoice;
use promptory_core::session::{PendingRequest, ResultStore};
use promptory_webhook::{ImageWebhook, WebhookConfig, WebhookError};

pub const PNG: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
pub const JPEG: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

const BOUNDARY: &str = "promptory-test-boundary";

/// Build a test `ServerConfig` with safe defaults and a 1 MiB upload limit.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:8080".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        session_idle_ttl_secs: 1800,
        session_sweep_interval_secs: 60,
        max_upload_bytes: 1024 * 1024,
        webhook: WebhookConfig::new("http://127.0.0.1:9/unused"),
    }
}

// ---------------------------------------------------------------------------
// Fake webhook
// ---------------------------------------------------------------------------

/// Stand-in for the image webhook that returns a canned response.
///
/// When gated, `submit` signals `entered` and then waits for `release`
/// before answering, which keeps a generation in flight for as long as a
/// test needs.
pub struct FakeWebhook {
    response: WebhookResponse,
    gated: bool,
    pub entered: Notify,
    pub release: Notify,
    calls: AtomicUsize,
    last_model: Mutex<Option<ModelChoice>>,
}

impl FakeWebhook {
    pub fn responding(status: u16, content_type: Option<&str>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            response: WebhookResponse {
                status,
                content_type: content_type.map(str::to_string),
                body: body.into(),
            },
            gated: false,
            entered: Notify::new(),
            release: Notify::new(),
            calls: AtomicUsize::new(0),
            last_model: Mutex::new(None),
        }
    }

    /// A webhook that answers with a 500-byte PNG.
    pub fn png() -> Self {
        Self::responding(200, Some("image/png"), vec![0xAA; 500])
    }

    pub fn gated(mut self) -> Self {
        self.gated = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_model(&self) -> Option<ModelChoice> {
        *self.last_model.lock().unwrap()
    }
}

#[async_trait]
impl ImageWebhook for FakeWebhook {
    async fn submit(&self, request: &PendingRequest) -> Result<WebhookResponse, WebhookError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_model.lock().unwrap() = Some(request.model);
        if self.gated {
            self.entered.notify_one();
            self.release.notified().await;
        }
        Ok(self.response.clone())
    }
}

// ---------------------------------------------------------------------------
// Test app
// ---------------------------------------------------------------------------

/// The router plus handles on the shared state it was built with.
pub struct TestApp {
    pub router: Router,
    pub sessions: Arc<SessionRegistry>,
    pub results: Arc<ResultStore>,
    pub webhook: Arc<FakeWebhook>,
}

/// Build the full application router (same middleware stack as production)
/// backed by the given fake webhook.
pub fn build_test_app(webhook: FakeWebhook) -> TestApp {
    let config = test_config();
    let sessions = Arc::new(SessionRegistry::new());
    let results = Arc::new(ResultStore::new());
    let webhook = Arc::new(webhook);

    let state = AppState {
        config: Arc::new(config.clone()),
        sessions: Arc::clone(&sessions),
        results: Arc::clone(&results),
        webhook: Arc::clone(&webhook) as Arc<dyn ImageWebhook>,
    };

    TestApp {
        router: build_app_router(state, &config),
        sessions,
        results,
        webhook,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn post(app: &Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn put_json(app: &Router, uri: &str, json: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::PUT)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn delete(app: &Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// PUT a single-file multipart form.
pub async fn put_file(
    app: &Router,
    uri: &str,
    field: &str,
    file_name: &str,
    content_type: &str,
    bytes: &[u8],
) -> Response {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::PUT)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

// ---------------------------------------------------------------------------
// Session helpers
// ---------------------------------------------------------------------------

/// Create a session and return its base URI.
pub async fn create_session(app: &Router) -> String {
    let json = body_json(post(app, "/api/v1/try-on/sessions").await).await;
    let id = json["data"]["id"].as_str().unwrap();
    format!("/api/v1/try-on/sessions/{id}")
}

/// Create a session with a PNG uploaded and the female model chosen.
pub async fn ready_session(app: &Router) -> String {
    let base = create_session(app).await;
    let response = put_file(app, &format!("{base}/image"), "image", "shirt.png", "image/png", &PNG).await;
    assert!(response.status().is_success());
    let response = put_json(app, &format!("{base}/model"), serde_json::json!({ "model": "female" })).await;
    assert!(response.status().is_success());
    base
}
