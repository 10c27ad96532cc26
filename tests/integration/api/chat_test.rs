//! Chat API integration tests
//!
//! Creation, listing, access checks, renaming, participants and deletion.

use std::time::Duration;

use askveda::backend::auth::create_token;
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::common::{create_chat, register_unique_user, send_message, TestApp, TEST_SECRET};
use crate::{assert_error, assert_status};

#[tokio::test]
async fn test_create_chat_gets_its_own_session() {
    let app = TestApp::new().await;
    let user = register_unique_user(&app).await;

    let first = app.post("/api/chats", Some(&user.token), json!({})).await;
    let second = app
        .post("/api/chats", Some(&user.token), json!({ "title": "Vedanta" }))
        .await;

    assert_status!(first, StatusCode::CREATED);
    assert_status!(second, StatusCode::CREATED);
    let first = first.json();
    let second = second.json();

    assert_eq!(first["message"], "Chat created successfully");
    assert_eq!(first["chat"]["title"], "New Chat");
    assert_eq!(second["chat"]["title"], "Vedanta");
    assert_eq!(first["chat"]["messageCount"], 0);

    let first_session = first["chat"]["sessionId"].as_str().unwrap();
    let second_session = second["chat"]["sessionId"].as_str().unwrap();
    assert_ne!(first_session, second_session);
    assert_ne!(first_session, user.session_id);
}

#[tokio::test]
async fn test_chats_require_authentication() {
    let app = TestApp::new().await;

    let response = app.post("/api/chats", None, json!({})).await;

    assert_error!(response, StatusCode::UNAUTHORIZED, "No token provided");
}

#[tokio::test]
async fn test_list_chats_most_recent_first() {
    let app = TestApp::new().await;
    let user = register_unique_user(&app).await;
    let other = register_unique_user(&app).await;

    let older = create_chat(&app, &user, "older").await;
    let newer = create_chat(&app, &user, "newer").await;
    create_chat(&app, &other, "not mine").await;
    send_message(&app, &user, &older, "bump", "user").await;

    let response = app.get("/api/chats", Some(&user.token)).await;

    assert_status!(response, StatusCode::OK);
    let chats = response.json()["chats"].as_array().unwrap().clone();
    let ids: Vec<&str> = chats.iter().map(|c| c["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec![older.as_str(), newer.as_str()]);
    assert_eq!(chats[0]["lastMessage"]["content"], "bump");
}

#[tokio::test]
async fn test_get_chat_access_rules() {
    let app = TestApp::new().await;
    let owner = register_unique_user(&app).await;
    let stranger = register_unique_user(&app).await;
    let chat_id = create_chat(&app, &owner, "private").await;

    let own = app.get(&format!("/api/chats/{}", chat_id), Some(&owner.token)).await;
    assert_status!(own, StatusCode::OK);
    assert_eq!(own.json()["chat"]["id"], chat_id.as_str());

    let denied = app
        .get(&format!("/api/chats/{}", chat_id), Some(&stranger.token))
        .await;
    assert_error!(denied, StatusCode::FORBIDDEN, "Access denied");

    let missing = app
        .get(&format!("/api/chats/{}", Uuid::new_v4()), Some(&owner.token))
        .await;
    assert_error!(missing, StatusCode::NOT_FOUND, "Chat not found");

    let malformed = app.get("/api/chats/not-an-id", Some(&owner.token)).await;
    assert_error!(malformed, StatusCode::NOT_FOUND, "Chat not found");
}

#[tokio::test]
async fn test_update_chat_title() {
    let app = TestApp::new().await;
    let owner = register_unique_user(&app).await;
    let chat_id = create_chat(&app, &owner, "draft").await;
    let uri = format!("/api/chats/{}", chat_id);

    let renamed = app.put(&uri, Some(&owner.token), json!({ "title": "final" })).await;
    assert_status!(renamed, StatusCode::OK);
    assert_eq!(renamed.json()["chat"]["title"], "final");

    let blank = app.put(&uri, Some(&owner.token), json!({ "title": "  " })).await;
    assert_status!(blank, StatusCode::OK);
    assert_eq!(blank.json()["chat"]["title"], "final");
}

#[tokio::test]
async fn test_only_creator_updates_or_deletes() {
    let app = TestApp::new().await;
    let owner = register_unique_user(&app).await;
    let member = register_unique_user(&app).await;
    let chat_id = create_chat(&app, &owner, "shared").await;
    let uri = format!("/api/chats/{}", chat_id);

    let added = app
        .post(
            &format!("{}/participants", uri),
            Some(&owner.token),
            json!({ "userId": member.id }),
        )
        .await;
    assert_status!(added, StatusCode::OK);

    let update = app.put(&uri, Some(&member.token), json!({ "title": "mine" })).await;
    assert_error!(update, StatusCode::FORBIDDEN, "Only chat creator can update chat");

    let delete = app.delete(&uri, Some(&member.token)).await;
    assert_error!(delete, StatusCode::FORBIDDEN, "Only chat creator can delete chat");
}

#[tokio::test]
async fn test_participant_can_read_chat() {
    let app = TestApp::new().await;
    let owner = register_unique_user(&app).await;
    let member = register_unique_user(&app).await;
    let chat_id = create_chat(&app, &owner, "shared").await;

    app.post(
        &format!("/api/chats/{}/participants", chat_id),
        Some(&owner.token),
        json!({ "userId": member.id }),
    )
    .await;

    let listed = app.get("/api/chats", Some(&member.token)).await;
    let chats = listed.json()["chats"].as_array().unwrap().clone();
    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0]["id"], chat_id.as_str());

    let fetched = app
        .get(&format!("/api/chats/{}", chat_id), Some(&member.token))
        .await;
    assert_status!(fetched, StatusCode::OK);
}

#[tokio::test]
async fn test_add_unknown_participant() {
    let app = TestApp::new().await;
    let owner = register_unique_user(&app).await;
    let chat_id = create_chat(&app, &owner, "shared").await;

    let response = app
        .post(
            &format!("/api/chats/{}/participants", chat_id),
            Some(&owner.token),
            json!({ "userId": Uuid::new_v4() }),
        )
        .await;

    assert_error!(response, StatusCode::NOT_FOUND, "User not found");
}

#[tokio::test]
async fn test_delete_chat_removes_messages() {
    let app = TestApp::new().await;
    let owner = register_unique_user(&app).await;
    let chat_id = create_chat(&app, &owner, "temp").await;
    let message = send_message(&app, &owner, &chat_id, "hello", "user").await;

    let response = app
        .delete(&format!("/api/chats/{}", chat_id), Some(&owner.token))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.json()["message"], "Chat deleted successfully");

    let gone = app
        .get(&format!("/api/chats/{}", chat_id), Some(&owner.token))
        .await;
    assert_status!(gone, StatusCode::NOT_FOUND);

    let message_gone = app
        .request(
            axum::http::Method::PUT,
            &format!("/api/messages/{}/read", message["id"].as_str().unwrap()),
            Some(&owner.token),
            None,
        )
        .await;
    assert_error!(message_gone, StatusCode::NOT_FOUND, "Message not found");
}

#[tokio::test]
async fn test_participant_checks_run_before_body_id() {
    let app = TestApp::new().await;
    let owner = register_unique_user(&app).await;
    let stranger = register_unique_user(&app).await;
    let chat_id = create_chat(&app, &owner, "shared").await;
    let uri = format!("/api/chats/{}/participants", chat_id);

    let not_owner = app.post(&uri, Some(&stranger.token), json!({})).await;
    assert_error!(not_owner, StatusCode::FORBIDDEN, "Only chat creator can add participants");

    let missing = app.post(&uri, Some(&owner.token), json!({})).await;
    assert_error!(missing, StatusCode::NOT_FOUND, "User not found");

    let malformed = app.post(&uri, Some(&owner.token), json!({ "userId": "nope" })).await;
    assert_error!(malformed, StatusCode::NOT_FOUND, "User not found");
}

#[tokio::test]
async fn test_unparseable_body_gets_json_error() {
    let app = TestApp::new().await;
    let user = register_unique_user(&app).await;

    let wrong_type = app
        .post("/api/chats", Some(&user.token), json!({ "title": 7 }))
        .await;
    assert_error!(wrong_type, StatusCode::BAD_REQUEST, "Invalid request body");
    assert_eq!(wrong_type.header("content-type"), Some("application/json"));

    let no_body = app
        .request(axum::http::Method::POST, "/api/chats", Some(&user.token), None)
        .await;
    assert_error!(no_body, StatusCode::BAD_REQUEST, "Expected a JSON request body");
}

#[tokio::test]
async fn test_create_chat_requires_login_session() {
    let app = TestApp::new().await;
    let user = register_unique_user(&app).await;
    let token = create_token(user.id, None, TEST_SECRET, Duration::from_secs(3600)).unwrap();

    let response = app.post("/api/chats", Some(&token), json!({ "title": "x" })).await;

    assert_error!(
        response,
        StatusCode::BAD_REQUEST,
        "Invalid session. Please login again."
    );
}
