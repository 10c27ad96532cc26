//! Admin API integration tests
//!
//! Listings with filters, chat detail, exports and statistics.

use axum::http::StatusCode;
use serde_json::json;

use crate::common::{create_chat, register_user, send_message, TestApp, TestUser};
use crate::{assert_contains, assert_error, assert_status};

/// Two users, one chat each, with a question and an answer in the first
async fn seeded() -> (TestApp, TestUser, TestUser, String, String) {
    let app = TestApp::new().await;
    let asha = register_user(&app, "asha", "+919800000001").await;
    let ravi = register_user(&app, "ravi", "+919800000002").await;

    let gita = create_chat(&app, &asha, "Gita study").await;
    let other = create_chat(&app, &ravi, "Upanishads").await;
    send_message(&app, &asha, &gita, "What is karma?", "user").await;
    send_message(&app, &asha, &gita, "Karma is action, \"as you sow\".", "assistant").await;

    (app, asha, ravi, gita, other)
}

#[tokio::test]
async fn test_admin_requires_authentication() {
    let app = TestApp::new().await;

    let response = app.get("/api/admin/stats", None).await;

    assert_error!(response, StatusCode::UNAUTHORIZED, "No token provided");
}

#[tokio::test]
async fn test_list_chats_with_filters() {
    let (app, asha, ravi, gita, _) = seeded().await;

    let all = app.get("/api/admin/chats", Some(&asha.token)).await;
    assert_status!(all, StatusCode::OK);
    let all = all.json();
    assert_eq!(all["pagination"]["total"], 2);
    assert_eq!(all["pagination"]["limit"], 20);

    let mine = app
        .get(&format!("/api/admin/chats?userId={}", ravi.id), Some(&asha.token))
        .await
        .json();
    assert_eq!(mine["chats"].as_array().unwrap().len(), 1);
    assert_eq!(mine["chats"][0]["createdBy"]["username"], "ravi");

    let searched = app
        .get("/api/admin/chats?search=GITA", Some(&asha.token))
        .await
        .json();
    assert_eq!(searched["chats"].as_array().unwrap().len(), 1);
    assert_eq!(searched["chats"][0]["id"], gita.as_str());

    let invalid = app
        .get("/api/admin/chats?userId=bogus", Some(&asha.token))
        .await;
    assert_error!(invalid, StatusCode::BAD_REQUEST, "Invalid userId");
}

#[tokio::test]
async fn test_list_messages_populates_chat_and_sender() {
    let (app, asha, _, gita, _) = seeded().await;

    let response = app
        .get(
            &format!("/api/admin/messages?chatId={}&role=assistant", gita),
            Some(&asha.token),
        )
        .await;

    assert_status!(response, StatusCode::OK);
    let body = response.json();
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "assistant");
    assert_eq!(messages[0]["chatId"]["title"], "Gita study");
    assert_eq!(messages[0]["sender"]["username"], "asha");
}

#[tokio::test]
async fn test_list_users_search() {
    let (app, asha, _, _, _) = seeded().await;

    let by_name = app
        .get("/api/admin/users?search=RAV", Some(&asha.token))
        .await
        .json();
    assert_eq!(by_name["users"].as_array().unwrap().len(), 1);
    assert_eq!(by_name["users"][0]["username"], "ravi");

    let by_mobile = app
        .get("/api/admin/users?search=9800000001", Some(&asha.token))
        .await
        .json();
    assert_eq!(by_mobile["users"][0]["username"], "asha");
}

#[tokio::test]
async fn test_chat_detail() {
    let (app, asha, _, gita, _) = seeded().await;

    let response = app
        .get(&format!("/api/admin/chats/{}", gita), Some(&asha.token))
        .await;

    assert_status!(response, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["chat"]["title"], "Gita study");
    assert_eq!(body["chat"]["messageCount"], 2);
    let contents: Vec<&str> = body["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["What is karma?", "Karma is action, \"as you sow\"."]);
}

#[tokio::test]
async fn test_export_chat_csv() {
    let (app, asha, _, gita, _) = seeded().await;

    let response = app
        .get(
            &format!("/api/admin/export/chat/{}?format=csv", gita),
            Some(&asha.token),
        )
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.header("content-type"), Some("text/csv"));
    assert_contains!(
        response.header("content-disposition").unwrap(),
        &format!("attachment; filename=\"{}.csv\"", gita)
    );
    assert_eq!(
        response.text(),
        "User's Question,Assistant's Response\n\
         What is karma?,\"Karma is action, \"\"as you sow\"\".\"\n"
    );
}

#[tokio::test]
async fn test_export_chat_json_and_bad_format() {
    let (app, asha, _, gita, _) = seeded().await;

    let json_export = app
        .get(&format!("/api/admin/export/chat/{}", gita), Some(&asha.token))
        .await;
    assert_status!(json_export, StatusCode::OK);
    assert_eq!(json_export.header("content-type"), Some("application/json"));
    assert_eq!(json_export.json()["messages"].as_array().unwrap().len(), 2);

    let xml = app
        .get(
            &format!("/api/admin/export/chat/{}?format=xml", gita),
            Some(&asha.token),
        )
        .await;
    assert_error!(xml, StatusCode::BAD_REQUEST, "Unsupported format");
}

#[tokio::test]
async fn test_export_session() {
    let (app, asha, _, gita, _) = seeded().await;
    let chat = app
        .get(&format!("/api/chats/{}", gita), Some(&asha.token))
        .await
        .json();
    let session_id = chat["chat"]["sessionId"].as_str().unwrap().to_string();

    let json_export = app
        .get(
            &format!("/api/admin/export/session/{}", session_id),
            Some(&asha.token),
        )
        .await;
    assert_status!(json_export, StatusCode::OK);
    let body = json_export.json();
    assert_eq!(body["sessionId"], session_id.as_str());
    assert_eq!(body["chats"].as_array().unwrap().len(), 1);
    assert_eq!(body["messages"].as_array().unwrap().len(), 2);

    let csv_export = app
        .get(
            &format!("/api/admin/export/session/{}?format=csv", session_id),
            Some(&asha.token),
        )
        .await;
    assert_status!(csv_export, StatusCode::OK);
    let text = csv_export.text();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("Message ID,Role,Content,Chat Title,Sender,Timestamp,Created At")
    );
    assert_eq!(lines.count(), 2);
    assert_contains!(text, "Gita study");

    let missing = app
        .get("/api/admin/export/session/sess_0_missing", Some(&asha.token))
        .await;
    assert_error!(missing, StatusCode::NOT_FOUND, "Session not found");
}

#[tokio::test]
async fn test_stats() {
    let (app, asha, _, _, _) = seeded().await;

    let response = app.get("/api/admin/stats", Some(&asha.token)).await;

    assert_status!(response, StatusCode::OK);
    let body = response.json();
    assert_eq!(
        body,
        json!({
            "totalUsers": 2,
            "totalChats": 2,
            "totalMessages": 2,
            "totalSessions": 2,
            "recentActivity": { "users": 2, "chats": 2, "messages": 2 }
        })
    );
}
