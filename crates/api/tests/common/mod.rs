#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use slate_api::config::ServerConfig;
use slate_api::router::build_app_router;
use slate_api::state::AppState;
use slate_core::memory_store::MemoryCallSheetStore;

pub const ORG: i64 = 7;
pub const PROJECT: i64 = 42;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: "postgres://unused".to_string(),
        database_max_connections: 1,
    }
}

/// Build the full application router over a fresh in-memory store.
///
/// The store is returned as well so tests can inspect it or inject faults.
pub fn build_test_app() -> (Router, Arc<MemoryCallSheetStore>) {
    build_test_app_with(test_config())
}

/// Like [`build_test_app`], with a caller-supplied configuration.
pub fn build_test_app_with(config: ServerConfig) -> (Router, Arc<MemoryCallSheetStore>) {
    let store = Arc::new(MemoryCallSheetStore::new());
    let state = AppState {
        store: store.clone(),
        config: Arc::new(config),
    };
    (build_app_router(state), store)
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Send a request with an optional organization header and JSON body.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    org: Option<i64>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(org) = org {
        builder = builder.header("x-organization-id", org.to_string());
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(ORG), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(ORG), Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(ORG), Some(body)).await
}
