/**
 * Register Handler
 *
 * POST /api/auth/register
 *
 * # Registration Process
 *
 * 1. Require non-blank username, mobile and password, within the
 *    column lengths
 * 2. Reject a username or mobile that is already taken
 * 3. Hash the password with bcrypt and store the user
 * 4. Record a login session and return a token for it
 */
use axum::{extract::State, http::StatusCode, response::Json};

use crate::backend::auth::handlers::session::issue_session;
use crate::backend::auth::handlers::types::{
    check_field_lengths, required, AuthResponse, ClientInfo, RegisterRequest,
};
use crate::backend::auth::users::{hash_password, User};
use crate::backend::error::BackendError;
use crate::backend::middleware::JsonBody;
use crate::backend::server::state::AppState;
use crate::backend::store::{StoreError, UserStore};

const DUPLICATE_USER: &str = "User with this mobile number or username already exists";

/// Register handler
///
/// # Errors
///
/// * `400 Bad Request` - a field is missing, or the user already exists
/// * `500 Internal Server Error` - hashing or storage failed
///
/// # Example Request
///
/// ```http
/// POST /api/auth/register HTTP/1.1
/// Content-Type: application/json
///
/// {"username": "asha", "mobile": "9876543210", "password": "secret"}
/// ```
pub async fn register(
    State(state): State<AppState>,
    client: ClientInfo,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), BackendError> {
    let (Some(username), Some(mobile), Some(password)) = (
        required(&request.username),
        required(&request.mobile),
        request.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(BackendError::bad_request(
            "Username, mobile and password are required",
        ));
    };
    check_field_lengths(username, mobile)?;

    tracing::info!("Registration request for: {}", username);

    let exists = state
        .repository
        .user_exists(username, mobile)
        .await
        .map_err(|e| BackendError::internal("Error creating user", e))?;
    if exists {
        tracing::warn!("Registration rejected, user exists: {}", username);
        return Err(BackendError::bad_request(DUPLICATE_USER));
    }

    let password_hash = hash_password(password.to_string(), state.config.bcrypt_cost)
        .await
        .map_err(|e| BackendError::internal("Error creating user", e))?;

    let user = User::new(username.to_string(), mobile.to_string(), password_hash);
    let user = match state.repository.create_user(user).await {
        Ok(user) => user,
        Err(StoreError::Conflict(_)) => return Err(BackendError::bad_request(DUPLICATE_USER)),
        Err(e) => return Err(BackendError::internal("Error creating user", e)),
    };

    let issued = issue_session(&state, &user, client, "Error creating user").await?;
    tracing::info!("User created successfully: {} ({})", user.username, user.id);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully".to_string(),
            token: issued.token,
            session_id: issued.session_id,
            user: user.public(),
        }),
    ))
}
