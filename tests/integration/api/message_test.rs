//! Message API integration tests
//!
//! Sending, history pages, read receipts, unread counts and deletion.

use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::common::{create_chat, register_unique_user, send_message, TestApp};
use crate::{assert_error, assert_status};

#[tokio::test]
async fn test_send_message_updates_chat() {
    let app = TestApp::new().await;
    let user = register_unique_user(&app).await;
    let chat_id = create_chat(&app, &user, "talk").await;

    let response = app
        .post(
            "/api/messages",
            Some(&user.token),
            json!({ "content": "  What is dharma?  ", "chatId": chat_id }),
        )
        .await;

    assert_status!(response, StatusCode::CREATED);
    let body = response.json();
    assert_eq!(body["message"], "Message sent successfully");
    assert_eq!(body["messageData"]["content"], "What is dharma?");
    assert_eq!(body["messageData"]["role"], "user");
    assert_eq!(body["messageData"]["sender"], user.id.to_string());

    let chat = app
        .get(&format!("/api/chats/{}", chat_id), Some(&user.token))
        .await
        .json();
    assert_eq!(chat["chat"]["messageCount"], 1);
    assert_eq!(chat["chat"]["lastMessage"]["content"], "What is dharma?");
    assert_eq!(body["messageData"]["sessionId"], chat["chat"]["sessionId"]);
}

#[tokio::test]
async fn test_send_message_validation() {
    let app = TestApp::new().await;
    let user = register_unique_user(&app).await;
    let chat_id = create_chat(&app, &user, "talk").await;

    let missing = app
        .post("/api/messages", Some(&user.token), json!({ "content": "hi" }))
        .await;
    assert_error!(missing, StatusCode::BAD_REQUEST, "Content and chatId are required");

    let bad_role = app
        .post(
            "/api/messages",
            Some(&user.token),
            json!({ "content": "hi", "chatId": chat_id, "role": "wizard" }),
        )
        .await;
    assert_status!(bad_role, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stranger_cannot_post_or_read() {
    let app = TestApp::new().await;
    let owner = register_unique_user(&app).await;
    let stranger = register_unique_user(&app).await;
    let chat_id = create_chat(&app, &owner, "private").await;

    let post = app
        .post(
            "/api/messages",
            Some(&stranger.token),
            json!({ "content": "hi", "chatId": chat_id }),
        )
        .await;
    assert_error!(post, StatusCode::FORBIDDEN, "Access denied");

    let history = app
        .get(&format!("/api/messages/chat/{}", chat_id), Some(&stranger.token))
        .await;
    assert_error!(history, StatusCode::FORBIDDEN, "Access denied");
}

#[tokio::test]
async fn test_history_pages_are_ascending() {
    let app = TestApp::new().await;
    let user = register_unique_user(&app).await;
    let chat_id = create_chat(&app, &user, "talk").await;

    for i in 0..5 {
        send_message(&app, &user, &chat_id, &format!("m{}", i), "user").await;
    }

    let response = app
        .get(
            &format!("/api/messages/chat/{}?page=2&limit=2", chat_id),
            Some(&user.token),
        )
        .await;

    assert_status!(response, StatusCode::OK);
    let body = response.json();
    let contents: Vec<&str> = body["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["m2", "m3"]);
    assert_eq!(body["pagination"]["total"], 5);
    assert_eq!(body["pagination"]["pages"], 3);
    assert_eq!(body["pagination"]["page"], 2);
}

#[tokio::test]
async fn test_read_receipts_and_unread_count() {
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

    let question = send_message(&app, &owner, &chat_id, "question", "user").await;
    send_message(&app, &owner, &chat_id, "answer", "assistant").await;
    send_message(&app, &member, &chat_id, "mine", "user").await;

    let unread_uri = format!("/api/messages/chat/{}/unread", chat_id);
    let unread = app.get(&unread_uri, Some(&member.token)).await;
    assert_status!(unread, StatusCode::OK);
    assert_eq!(unread.json()["unreadCount"], 2);

    let read_uri = format!("/api/messages/{}/read", question["id"].as_str().unwrap());
    for _ in 0..2 {
        let read = app.request(Method::PUT, &read_uri, Some(&member.token), None).await;
        assert_status!(read, StatusCode::OK);
        let data = read.json()["messageData"].clone();
        assert_eq!(data["isRead"], true);
        assert_eq!(data["readBy"].as_array().unwrap().len(), 1);
    }

    let unread = app.get(&unread_uri, Some(&member.token)).await;
    assert_eq!(unread.json()["unreadCount"], 1);
}

#[tokio::test]
async fn test_only_sender_deletes_message() {
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

    let message = send_message(&app, &owner, &chat_id, "keep me", "user").await;
    let uri = format!("/api/messages/{}", message["id"].as_str().unwrap());

    let denied = app.delete(&uri, Some(&member.token)).await;
    assert_error!(denied, StatusCode::FORBIDDEN, "Only message sender can delete message");

    let deleted = app.delete(&uri, Some(&owner.token)).await;
    assert_status!(deleted, StatusCode::OK);
    assert_eq!(deleted.json()["message"], "Message deleted successfully");

    let again = app.delete(&uri, Some(&owner.token)).await;
    assert_error!(again, StatusCode::NOT_FOUND, "Message not found");
}
