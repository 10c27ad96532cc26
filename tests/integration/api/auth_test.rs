//! Authentication API integration tests
//!
//! Registration, login, the current-user endpoint and logout.

use axum::http::StatusCode;
use serde_json::json;

use crate::common::{register_user, TestApp};
use crate::{assert_error, assert_status};

#[tokio::test]
async fn test_register_success() {
    let app = TestApp::new().await;

    let response = app
        .post(
            "/api/auth/register",
            None,
            json!({ "username": "asha", "mobile": "+919800000001", "password": "password123" }),
        )
        .await;

    assert_status!(response, StatusCode::CREATED);
    let body = response.json();
    assert_eq!(body["message"], "User created successfully");
    assert!(body["token"].is_string());
    assert!(body["sessionId"].as_str().unwrap().starts_with("sess_"));
    assert_eq!(body["user"]["username"], "asha");
    assert_eq!(body["user"]["isOnline"], false);
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_register_missing_fields() {
    let app = TestApp::new().await;

    let response = app
        .post("/api/auth/register", None, json!({ "username": "asha" }))
        .await;

    assert_error!(
        response,
        StatusCode::BAD_REQUEST,
        "Username, mobile and password are required"
    );
}

#[tokio::test]
async fn test_register_rejects_overlong_username() {
    let app = TestApp::new().await;

    let response = app
        .post(
            "/api/auth/register",
            None,
            json!({ "username": "a".repeat(65), "mobile": "9800000099", "password": "secret" }),
        )
        .await;

    assert_error!(
        response,
        StatusCode::BAD_REQUEST,
        "Username must be at most 64 characters"
    );
}

#[tokio::test]
async fn test_register_duplicate_mobile_or_username() {
    let app = TestApp::new().await;
    register_user(&app, "asha", "+919800000001").await;

    let same_mobile = app
        .post(
            "/api/auth/register",
            None,
            json!({ "username": "ravi", "mobile": "+919800000001", "password": "password123" }),
        )
        .await;
    let same_username = app
        .post(
            "/api/auth/register",
            None,
            json!({ "username": "asha", "mobile": "+919800000002", "password": "password123" }),
        )
        .await;

    for response in [same_mobile, same_username] {
        assert_error!(
            response,
            StatusCode::BAD_REQUEST,
            "User with this mobile number or username already exists"
        );
    }
}

#[tokio::test]
async fn test_login_success_marks_user_online() {
    let app = TestApp::new().await;
    let user = register_user(&app, "asha", "+919800000001").await;

    let response = app
        .post(
            "/api/auth/login",
            None,
            json!({ "mobile": user.mobile, "password": user.password }),
        )
        .await;

    assert_status!(response, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["isOnline"], true);
    assert_ne!(body["sessionId"], user.session_id.as_str());
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let app = TestApp::new().await;
    let user = register_user(&app, "asha", "+919800000001").await;

    let wrong_password = app
        .post(
            "/api/auth/login",
            None,
            json!({ "mobile": user.mobile, "password": "nope" }),
        )
        .await;
    let unknown_mobile = app
        .post(
            "/api/auth/login",
            None,
            json!({ "mobile": "+10000000000", "password": "password123" }),
        )
        .await;

    for response in [wrong_password, unknown_mobile] {
        assert_error!(response, StatusCode::UNAUTHORIZED, "Invalid mobile or password");
    }
}

#[tokio::test]
async fn test_login_missing_fields() {
    let app = TestApp::new().await;

    let response = app.post("/api/auth/login", None, json!({ "mobile": "" })).await;

    assert_error!(response, StatusCode::BAD_REQUEST, "Mobile and password are required");
}

#[tokio::test]
async fn test_get_me_with_valid_token() {
    let app = TestApp::new().await;
    let user = register_user(&app, "asha", "+919800000001").await;

    let response = app.get("/api/auth/me", Some(&user.token)).await;

    assert_status!(response, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["user"]["id"], user.id.to_string());
    assert_eq!(body["user"]["mobile"], "+919800000001");
}

#[tokio::test]
async fn test_get_me_without_or_with_bad_token() {
    let app = TestApp::new().await;

    let missing = app.get("/api/auth/me", None).await;
    assert_error!(missing, StatusCode::UNAUTHORIZED, "No token provided");

    let invalid = app.get("/api/auth/me", Some("not.a.jwt")).await;
    assert_error!(invalid, StatusCode::UNAUTHORIZED, "Invalid token");
}

#[tokio::test]
async fn test_logout() {
    let app = TestApp::new().await;
    let user = register_user(&app, "asha", "+919800000001").await;

    let response = app
        .request(axum::http::Method::POST, "/api/auth/logout", Some(&user.token), None)
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.json()["message"], "Logout successful");

    let unauthenticated = app
        .request(axum::http::Method::POST, "/api/auth/logout", None, None)
        .await;
    assert_status!(unauthenticated, StatusCode::UNAUTHORIZED);
}
