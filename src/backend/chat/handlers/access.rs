/**
 * Chat Access Checks
 *
 * Loading a chat by a path id and checking the caller against it, shared by
 * the chat, message and admin handlers.
 */
use uuid::Uuid;

use crate::backend::chat::db::Chat;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::backend::store::ChatStore;

/// Parse a path id; malformed ids are reported as `not_found`
pub fn parse_id(raw: &str, not_found: &'static str) -> Result<Uuid, BackendError> {
    Uuid::parse_str(raw).map_err(|_| {
        tracing::warn!("Malformed id: {}", raw);
        BackendError::not_found(not_found)
    })
}

/// Load a chat or fail with `404 Chat not found`
///
/// `failure` is the 500 message used when storage fails.
pub async fn load_chat(
    state: &AppState,
    raw_id: &str,
    failure: &'static str,
) -> Result<Chat, BackendError> {
    let id = parse_id(raw_id, "Chat not found")?;
    state
        .repository
        .find_chat(id)
        .await
        .map_err(|e| BackendError::internal(failure, e))?
        .ok_or_else(|| BackendError::not_found("Chat not found"))
}

/// Load a chat the user may read and write (creator or participant)
pub async fn load_accessible_chat(
    state: &AppState,
    raw_id: &str,
    user_id: Uuid,
    failure: &'static str,
) -> Result<Chat, BackendError> {
    let chat = load_chat(state, raw_id, failure).await?;
    ensure_access(&chat, user_id)?;
    Ok(chat)
}

pub fn ensure_access(chat: &Chat, user_id: Uuid) -> Result<(), BackendError> {
    if chat.can_access(user_id) {
        Ok(())
    } else {
        tracing::warn!("User {} denied access to chat {}", user_id, chat.id);
        Err(BackendError::forbidden("Access denied"))
    }
}

/// Load a chat the user created; `denied` is the 403 message
pub async fn load_owned_chat(
    state: &AppState,
    raw_id: &str,
    user_id: Uuid,
    denied: &'static str,
    failure: &'static str,
) -> Result<Chat, BackendError> {
    let chat = load_chat(state, raw_id, failure).await?;
    if !chat.is_creator(user_id) {
        tracing::warn!("User {} is not the creator of chat {}", user_id, chat.id);
        return Err(BackendError::forbidden(denied));
    }
    Ok(chat)
}
