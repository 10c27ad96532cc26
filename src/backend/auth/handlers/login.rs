/**
 * Login Handler
 *
 * POST /api/auth/login
 *
 * # Authentication Process
 *
 * 1. Look up the user by mobile number
 * 2. Verify the password with bcrypt
 * 3. Mark the user online
 * 4. Record a login session (user agent and client address)
 * 5. Return a token carrying the session id
 *
 * # Security
 *
 * - Unknown mobile and wrong password return the same 401
 * - Passwords are never logged or returned in responses
 */
use axum::{extract::State, response::Json};
use chrono::Utc;

use crate::backend::auth::handlers::session::issue_session;
use crate::backend::auth::handlers::types::{required, AuthResponse, ClientInfo, LoginRequest};
use crate::backend::auth::users::verify_password;
use crate::backend::error::BackendError;
use crate::backend::middleware::JsonBody;
use crate::backend::server::state::AppState;
use crate::backend::store::UserStore;

const INVALID_CREDENTIALS: &str = "Invalid mobile or password";

/// Login handler
///
/// # Errors
///
/// * `400 Bad Request` - mobile or password missing
/// * `401 Unauthorized` - unknown mobile or wrong password
/// * `500 Internal Server Error` - storage or token failure
pub async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>, BackendError> {
    let (Some(mobile), Some(password)) = (
        required(&request.mobile),
        request.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(BackendError::bad_request("Mobile and password are required"));
    };

    tracing::info!("Login request for: {}", mobile);

    let mut user = state
        .repository
        .find_user_by_mobile(mobile)
        .await
        .map_err(|e| BackendError::internal("Error during login", e))?
        .ok_or_else(|| {
            tracing::warn!("User not found: {}", mobile);
            BackendError::unauthorized(INVALID_CREDENTIALS)
        })?;

    if !verify_password(password.to_string(), user.password_hash.clone()).await {
        tracing::warn!("Invalid password for user: {}", user.username);
        return Err(BackendError::unauthorized(INVALID_CREDENTIALS));
    }

    state
        .repository
        .set_user_online(user.id, true)
        .await
        .map_err(|e| BackendError::internal("Error during login", e))?;
    user.is_online = true;
    user.last_seen = Utc::now();

    let issued = issue_session(&state, &user, client, "Error during login").await?;
    tracing::info!("User logged in successfully: {} ({})", user.username, issued.session_id);

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token: issued.token,
        session_id: issued.session_id,
        user: user.public(),
    }))
}
