/**
 * Authentication Handler Types
 *
 * Request and response bodies of the `/api/auth` endpoints, plus the
 * `ClientInfo` extractor that records where a login came from.
 */
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header::USER_AGENT, request::Parts, HeaderMap},
};
use serde::{Deserialize, Serialize};

use crate::backend::error::BackendError;
use crate::shared::messaging::PublicUser;

/// Longest username the `users` table stores
pub const MAX_USERNAME_CHARS: usize = 64;
/// Longest mobile number the `users` table stores
pub const MAX_MOBILE_CHARS: usize = 32;

/// Register request
///
/// Fields are optional so missing ones produce the API's own 400 message
/// instead of a deserialization rejection.
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Login request
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct LoginRequest {
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Auth response
///
/// Returned by register and login. The token carries the login session id
/// that is also returned as `sessionId`.
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub session_id: String,
    pub user: PublicUser,
}

/// Body of `GET /api/auth/me`
#[derive(Serialize, Deserialize, Debug)]
pub struct UserResponse {
    pub user: PublicUser,
}

/// Trim a required field; blank values count as missing
pub fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Reject usernames and mobile numbers longer than their columns
pub fn check_field_lengths(username: &str, mobile: &str) -> Result<(), BackendError> {
    if username.chars().count() > MAX_USERNAME_CHARS {
        return Err(BackendError::bad_request(format!(
            "Username must be at most {} characters",
            MAX_USERNAME_CHARS
        )));
    }
    if mobile.chars().count() > MAX_MOBILE_CHARS {
        return Err(BackendError::bad_request(format!(
            "Mobile number must be at most {} characters",
            MAX_MOBILE_CHARS
        )));
    }
    Ok(())
}

/// User agent and address of the client making a request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientInfo {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

impl ClientInfo {
    fn from_parts(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let user_agent = headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // First hop of X-Forwarded-For when behind a proxy
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Self {
            user_agent,
            ip_address: forwarded.or_else(|| peer.map(|addr| addr.ip().to_string())),
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ClientInfo {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Self::from_parts(&parts.headers, peer))
    }
}
