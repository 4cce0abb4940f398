#![allow(dead_code, clippy::panic, clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use tower::ServiceExt;

use mockfish_core::ServerConfig;
use mockfish_server::auth::StaticCredentials;
use mockfish_server::server::{AppState, build_router};

pub const ADMIN: (&str, &str) = ("admin", "password");

pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl Response {
    pub fn header(&self, name: &str) -> &str {
        self.headers
            .get(name)
            .unwrap_or_else(|| panic!("missing header {name}"))
            .to_str()
            .unwrap()
    }
}

pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.tls.enabled = false;
    config.tasks.step_delay_ms = 10;
    config
}

/// Router plus the state behind it, for direct store inspection.
pub fn app_with(config: &ServerConfig) -> (Router, AppState) {
    let state = AppState::new(config, Arc::new(StaticCredentials::seeded()));
    (build_router(state.clone()), state)
}

pub fn app() -> (Router, AppState) {
    app_with(&test_config())
}

pub fn basic(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}

pub fn admin() -> String {
    basic(ADMIN.0, ADMIN.1)
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    headers: &[(&str, &str)],
    body: Option<&str>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    for &(name, value) in headers {
        builder = builder.header(name, value);
    }
    let body = body.map_or_else(Body::empty, |b| Body::from(b.to_string()));
    let resp = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    Response {
        status,
        headers,
        body,
    }
}

/// Authenticated GET as the seeded administrator.
pub async fn get(app: &Router, uri: &str) -> Response {
    send(app, Method::GET, uri, &[("authorization", &admin())], None).await
}

/// Authenticated POST as the seeded administrator.
pub async fn post(app: &Router, uri: &str, body: Option<&str>) -> Response {
    send(app, Method::POST, uri, &[("authorization", &admin())], body).await
}

/// Poll a task until it reports `state`.
pub async fn wait_for_task_state(app: &Router, task_uri: &str, state: &str) -> Value {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let resp = get(app, task_uri).await;
            if resp.body["TaskState"] == state {
                return resp.body;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("task {task_uri} never reached {state}"))
}
