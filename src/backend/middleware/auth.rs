/**
 * Authentication Middleware
 *
 * Protects routes that require a logged-in user. The bearer token is read
 * from the Authorization header, verified, and resolved to a stored user;
 * the user and the token's login session id are attached to the request
 * extensions for handlers.
 *
 * # Rejections
 *
 * - `401 No token provided` - header missing or not a bearer token
 * - `401 Invalid token` - bad signature, expired, or malformed subject
 * - `404 User not found` - token is valid but the user no longer exists
 *
 * The AI routes use the lighter `token_middleware`, which only verifies the
 * token (`401 Access token required` / `403 Invalid token`).
 */
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::backend::auth::tokens::{bearer_token, verify_token, Claims};
use crate::backend::auth::users::User;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::backend::store::UserStore;

/// Authenticated user data attached by `auth_middleware`
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user: User,
    /// Login session id carried by the token
    pub session_id: Option<String>,
}

fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
}

/// Resolve the bearer token of a request to a stored user
pub async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<AuthenticatedUser, BackendError> {
    let token = token_from_headers(headers).ok_or_else(|| {
        tracing::warn!("Missing Authorization header");
        BackendError::unauthorized("No token provided")
    })?;

    let claims = verify_token(token, &state.config.jwt_secret).map_err(|e| {
        tracing::warn!("Invalid token: {:?}", e);
        BackendError::unauthorized("Invalid token")
    })?;

    let user_id = claims.user_id().ok_or_else(|| {
        tracing::warn!("Invalid user ID in token: {}", claims.sub);
        BackendError::unauthorized("Invalid token")
    })?;

    let user = state
        .repository
        .find_user(user_id)
        .await
        .map_err(|e| BackendError::internal("Error verifying user", e))?
        .ok_or_else(|| {
            tracing::warn!("Token for unknown user {}", user_id);
            BackendError::not_found("User not found")
        })?;

    Ok(AuthenticatedUser {
        user,
        session_id: claims.sid,
    })
}

/// Authentication middleware
///
/// Attaches `AuthenticatedUser` to the request extensions, or rejects the
/// request before it reaches the handler.
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let authenticated = authenticate(&app_state, request.headers()).await?;
    request.extensions_mut().insert(authenticated);
    Ok(next.run(request).await)
}

/// Token-only middleware for the AI proxy routes
///
/// Verifies the token without loading the user and attaches its `Claims`.
pub async fn token_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let token = token_from_headers(request.headers()).ok_or_else(|| {
        tracing::warn!("AI request without access token");
        BackendError::unauthorized("Access token required")
    })?;

    let claims: Claims = verify_token(token, &app_state.config.jwt_secret).map_err(|e| {
        tracing::warn!("AI request with invalid token: {:?}", e);
        BackendError::forbidden("Invalid token")
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Axum extractor for the authenticated user
///
/// Only valid on routes behind `auth_middleware`.
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("AuthenticatedUser not found in request extensions");
                BackendError::unauthorized("No token provided")
            })?;

        Ok(AuthUser(user))
    }
}
