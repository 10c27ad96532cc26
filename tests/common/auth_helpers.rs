//! Authentication test helpers
//!
//! Registers users through the API so tokens carry a real login session.

use axum::http::StatusCode;
use uuid::Uuid;

use super::app::TestApp;

/// Test user credentials
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub mobile: String,
    pub password: String,
    pub token: String,
    pub session_id: String,
}

/// Register a user and return its credentials
pub async fn register_user(app: &TestApp, username: &str, mobile: &str) -> TestUser {
    let password = "password123";
    let response = app
        .post(
            "/api/auth/register",
            None,
            serde_json::json!({
                "username": username,
                "mobile": mobile,
                "password": password,
            }),
        )
        .await;
    assert_eq!(
        response.status,
        StatusCode::CREATED,
        "register failed: {}",
        response.text()
    );

    let body = response.json();
    TestUser {
        id: body["user"]["id"]
            .as_str()
            .and_then(|id| Uuid::parse_str(id).ok())
            .expect("user id in register response"),
        username: username.to_string(),
        mobile: mobile.to_string(),
        password: password.to_string(),
        token: body["token"].as_str().expect("token").to_string(),
        session_id: body["sessionId"].as_str().expect("sessionId").to_string(),
    }
}

/// Register a user with a unique username and mobile number
pub async fn register_unique_user(app: &TestApp) -> TestUser {
    let suffix = Uuid::new_v4().simple().to_string();
    let username = format!("user_{}", &suffix[..8]);
    let mobile = format!("+1{}", &suffix[..10]);
    register_user(app, &username, &mobile).await
}

/// Create a chat for `user` and return its id
pub async fn create_chat(app: &TestApp, user: &TestUser, title: &str) -> String {
    let response = app
        .post(
            "/api/chats",
            Some(&user.token),
            serde_json::json!({ "title": title }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
    response.json()["chat"]["id"]
        .as_str()
        .expect("chat id")
        .to_string()
}

/// Send a message to a chat and return the stored message JSON
pub async fn send_message(
    app: &TestApp,
    user: &TestUser,
    chat_id: &str,
    content: &str,
    role: &str,
) -> serde_json::Value {
    let response = app
        .post(
            "/api/messages",
            Some(&user.token),
            serde_json::json!({ "content": content, "chatId": chat_id, "role": role }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
    response.json()["messageData"].clone()
}
