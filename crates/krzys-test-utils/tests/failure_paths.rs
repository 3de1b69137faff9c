// SPDX-FileCopyrightText: 2026 Krzys Comm Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-side failures surface as 500/503 with a generic body.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use krzys_core::StorageAdapter;
use krzys_gateway::{AppState, router};
use krzys_test_utils::MockStorage;
use serde_json::Value;
use tower::ServiceExt;

async fn call(app: &axum::Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn storage_failures_are_internal_errors() {
    let storage = Arc::new(MockStorage::new());
    storage.initialize().await.unwrap();
    let app = router(AppState::new(storage.clone(), None));

    storage.set_failing(true);
    for (method, uri, body) in [
        ("GET", "/state", ""),
        ("POST", "/state", r#"{"energy": 1}"#),
        ("POST", "/comm", r#"{"message": "x"}"#),
        ("GET", "/history", ""),
    ] {
        let (status, json) = call(&app, method, uri, body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{method} {uri}");
        assert_eq!(json["error"], "internal server error");
    }

    let (status, json) = call(&app, "GET", "/health", "").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], "unhealthy");
}

#[tokio::test]
async fn validation_wins_over_storage_failure() {
    let storage = Arc::new(MockStorage::new());
    storage.initialize().await.unwrap();
    storage.set_failing(true);
    let app = router(AppState::new(storage, None));

    let (status, _) = call(&app, "POST", "/state", r#"{"energy": 500}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_status_record_is_not_found() {
    let storage = Arc::new(MockStorage::new());
    let app = router(AppState::new(storage, None));

    let (status, json) = call(&app, "GET", "/state", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("status record"));
}
