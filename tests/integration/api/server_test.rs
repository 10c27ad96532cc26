//! Service route integration tests

use axum::http::StatusCode;

use crate::common::TestApp;
use crate::{assert_error, assert_status};

#[tokio::test]
async fn test_root_and_health() {
    let app = TestApp::new().await;

    let root = app.get("/", None).await;
    assert_status!(root, StatusCode::OK);
    assert_eq!(root.json()["message"], "askVeda API is running");

    let health = app.get("/api/health", None).await;
    assert_status!(health, StatusCode::OK);
    let body = health.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["environment"], "test");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_unknown_route() {
    let app = TestApp::new().await;

    let response = app.get("/api/unknown", None).await;

    assert_error!(response, StatusCode::NOT_FOUND, "Route not found");
}

#[tokio::test]
async fn test_websocket_route_requires_upgrade() {
    let app = TestApp::new().await;

    let response = app.get("/ws", None).await;

    assert!(response.status.is_client_error(), "status {}", response.status);
}
