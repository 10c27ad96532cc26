/**
 * Current User and Logout Handlers
 *
 * Both read the bearer token themselves rather than sitting behind
 * `auth_middleware`, and reject with the same errors it uses.
 */
use axum::{extract::State, http::HeaderMap, response::Json};

use crate::backend::auth::handlers::types::UserResponse;
use crate::backend::error::BackendError;
use crate::backend::middleware::authenticate;
use crate::backend::server::state::AppState;
use crate::backend::store::{SessionStore, UserStore};
use crate::shared::messaging::Confirmation;

/// Get current user (GET /api/auth/me)
///
/// # Errors
///
/// * `401 Unauthorized` - missing or invalid token
/// * `404 Not Found` - the token's user no longer exists
pub async fn get_me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, BackendError> {
    let authenticated = authenticate(&state, &headers).await?;
    Ok(Json(UserResponse {
        user: authenticated.user.public(),
    }))
}

/// Log out (POST /api/auth/logout)
///
/// Ends the token's login session, if it carries one, and marks the user
/// offline. The token itself stays valid until it expires.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Confirmation>, BackendError> {
    let authenticated = authenticate(&state, &headers).await?;

    if let Some(session_id) = &authenticated.session_id {
        let ended = state
            .repository
            .end_session(session_id)
            .await
            .map_err(|e| BackendError::internal("Error during logout", e))?;
        tracing::info!("Session {} ended: {}", session_id, ended);
    }

    state
        .repository
        .set_user_online(authenticated.user.id, false)
        .await
        .map_err(|e| BackendError::internal("Error during logout", e))?;

    tracing::info!("User logged out: {}", authenticated.user.username);
    Ok(Json(Confirmation::new("Logout successful")))
}
