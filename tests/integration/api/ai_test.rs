//! AI proxy integration tests
//!
//! The upstream service is a wiremock server; the fallback path uses an
//! unreachable address with instant pacing.

use axum::http::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{create_chat, register_unique_user, TestApp};
use crate::{assert_contains, assert_error, assert_status};

#[tokio::test]
async fn test_ai_routes_require_token() {
    let app = TestApp::new().await;

    let missing = app.post("/api/ai/chat", None, json!({ "message": "hi" })).await;
    assert_error!(missing, StatusCode::UNAUTHORIZED, "Access token required");

    let invalid = app
        .post("/api/ai/chat", Some("garbage"), json!({ "message": "hi" }))
        .await;
    assert_error!(invalid, StatusCode::FORBIDDEN, "Invalid token");
}

#[tokio::test]
async fn test_message_is_required() {
    let app = TestApp::new().await;
    let user = register_unique_user(&app).await;

    let response = app
        .post("/api/ai/stream", Some(&user.token), json!({ "message": "" }))
        .await;

    assert_error!(response, StatusCode::BAD_REQUEST, "Message is required");
}

#[tokio::test]
async fn test_non_string_message_is_bad_request() {
    let app = TestApp::new().await;
    let user = register_unique_user(&app).await;

    let response = app
        .post("/api/ai/chat", Some(&user.token), json!({ "message": 42 }))
        .await;

    assert_error!(response, StatusCode::BAD_REQUEST, "Invalid request body");
}

#[tokio::test]
async fn test_chat_uses_upstream_with_chat_session() {
    let server = MockServer::start().await;
    let app = TestApp::with_ai_service(&server.uri()).await;
    let user = register_unique_user(&app).await;
    let chat_id = create_chat(&app, &user, "ask").await;
    let session_id = app
        .get(&format!("/api/chats/{}", chat_id), Some(&user.token))
        .await
        .json()["chat"]["sessionId"]
        .as_str()
        .unwrap()
        .to_string();

    Mock::given(method("POST"))
        .and(path("/stream"))
        .and(body_partial_json(json!({ "session_id": session_id })))
        .respond_with(ResponseTemplate::new(200).set_body_string("Dharma is duty."))
        .expect(1)
        .mount(&server)
        .await;

    let response = app
        .post(
            "/api/ai/chat",
            Some(&user.token),
            json!({ "message": "What is dharma?", "chatId": chat_id }),
        )
        .await;

    assert_status!(response, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["response"], "Dharma is duty.");
    assert_eq!(body["source"], "fastapi");
}

#[tokio::test]
async fn test_stream_relays_upstream_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_string("chunk-1 chunk-2"))
        .mount(&server)
        .await;

    let app = TestApp::with_ai_service(&server.uri()).await;
    let user = register_unique_user(&app).await;

    let response = app
        .post("/api/ai/stream", Some(&user.token), json!({ "message": "hello" }))
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.header("content-type"), Some("text/plain"));
    assert_eq!(response.header("cache-control"), Some("no-cache"));
    assert_eq!(response.header("x-accel-buffering"), Some("no"));
    assert_eq!(response.text(), "chunk-1 chunk-2");
}

#[tokio::test]
async fn test_upstream_error_status_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stream"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let app = TestApp::with_ai_service(&server.uri()).await;
    let user = register_unique_user(&app).await;

    let response = app
        .post("/api/ai/chat", Some(&user.token), json!({ "message": "hello" }))
        .await;

    assert_status!(response, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["source"], "fallback");
    assert_contains!(
        body["response"].as_str().unwrap(),
        "I received your message: \"hello\"."
    );
}

#[tokio::test]
async fn test_unreachable_service_streams_simulated_frames() {
    let app = TestApp::new().await;
    let user = register_unique_user(&app).await;

    let response = app
        .post("/api/ai/stream", Some(&user.token), json!({ "message": "hi" }))
        .await;

    assert_status!(response, StatusCode::OK);
    let text = response.text();
    assert!(text.starts_with("data: {\"content\":\"I\"}\n\n"));
    assert!(text.ends_with("data: [DONE]\n\n"));

    let streamed: String = text
        .split("\n\n")
        .filter_map(|frame| frame.strip_prefix("data: "))
        .filter(|payload| *payload != "[DONE]")
        .map(|payload| {
            let value: serde_json::Value = serde_json::from_str(payload).unwrap();
            value["content"].as_str().unwrap().to_string()
        })
        .collect();
    assert_contains!(streamed, "I received your message: \"hi\".");
    assert_contains!(streamed, "simulated streaming response");
}
