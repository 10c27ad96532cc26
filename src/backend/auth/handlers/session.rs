/**
 * Login Session Issuing
 *
 * Shared tail of register and login: record a login session and sign a
 * token that carries its id.
 */
use crate::backend::auth::handlers::types::ClientInfo;
use crate::backend::auth::sessions::LoginSession;
use crate::backend::auth::tokens::create_token;
use crate::backend::auth::users::User;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::backend::store::SessionStore;

/// Token and login session id issued to a user
pub struct IssuedSession {
    pub token: String,
    pub session_id: String,
}

/// Record a login session for `user` and sign its token
///
/// `failure` is the 500 message reported when either step fails.
pub async fn issue_session(
    state: &AppState,
    user: &User,
    client: ClientInfo,
    failure: &'static str,
) -> Result<IssuedSession, BackendError> {
    let session = LoginSession::start(user.id, client.user_agent, client.ip_address);
    let session = state
        .repository
        .create_session(session)
        .await
        .map_err(|e| BackendError::internal(failure, e))?;

    let token = create_token(
        user.id,
        Some(&session.session_id),
        &state.config.jwt_secret,
        state.config.jwt_ttl,
    )
    .map_err(|e| BackendError::internal(failure, e))?;

    Ok(IssuedSession {
        token,
        session_id: session.session_id,
    })
}
