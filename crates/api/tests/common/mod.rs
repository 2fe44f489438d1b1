#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};
use chrono::FixedOffset;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use gathering_api::config::ServerConfig;
use gathering_api::export_flow::build_exporter;
use gathering_api::router::build_app_router;
use gathering_api::state::AppState;
use gathering_sheets::IDEMPOTENCY_KEY_HEADER;

/// A `ServerConfig` with development defaults and no spreadsheet webhook.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        sheets_webhook_url: None,
        export_attempt_timeout_secs: 10,
        // Immediate retries so failing webhooks do not slow the tests down.
        export_retry_delays_secs: vec![0, 0],
        sheets_view_url: Some("https://docs.example.com/sheet".to_string()),
        display_offset: FixedOffset::east_opt(8 * 3600).unwrap(),
        dashboard_page_size: 10,
        notice_clear_ms: 3000,
    }
}

/// The production router over `pool`, with export disabled.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState::new(pool, config.clone(), None);
    build_app_router(state, &config)
}

/// The production router built from `config`, exporter included when a
/// webhook URL is set.
pub fn build_test_app_with_config(pool: PgPool, config: ServerConfig) -> Router {
    let exporter = build_exporter(&config).unwrap();
    let state = AppState::new(pool, config.clone(), exporter);
    build_app_router(state, &config)
}

/// The production router with an exporter pointed at `webhook_url`.
pub fn build_test_app_with_exporter(pool: PgPool, webhook_url: &str) -> Router {
    let mut config = test_config();
    config.sheets_webhook_url = Some(webhook_url.to_string());
    build_test_app_with_config(pool, config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response {
    send(app, Method::POST, uri, None).await
}

pub async fn put_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Spreadsheet webhook stand-in
// ---------------------------------------------------------------------------

/// Local webhook that records every payload and its idempotency key.
/// Answers 500 while `failing`, after waiting `delay`.
#[derive(Clone, Default)]
pub struct SheetSink {
    pub payloads: Arc<Mutex<Vec<Value>>>,
    pub keys: Arc<Mutex<Vec<Option<String>>>>,
    pub failing: Arc<AtomicBool>,
    pub delay: Duration,
}

impl SheetSink {
    pub fn failing() -> Self {
        let sink = Self::default();
        sink.failing.store(true, Ordering::SeqCst);
        sink
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn payloads(&self) -> Vec<Value> {
        self.payloads.lock().unwrap().clone()
    }

    pub fn keys(&self) -> Vec<Option<String>> {
        self.keys.lock().unwrap().clone()
    }
}

async fn receive(
    State(sink): State<SheetSink>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    let key = headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    sink.keys.lock().unwrap().push(key);
    sink.payloads.lock().unwrap().push(body);
    if !sink.delay.is_zero() {
        tokio::time::sleep(sink.delay).await;
    }
    if sink.failing.load(Ordering::SeqCst) {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    }
}

/// Serve `sink` on an ephemeral port and return its URL.
pub async fn spawn_sheet_sink(sink: SheetSink) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/exec", post(receive)).with_state(sink);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/exec")
}
