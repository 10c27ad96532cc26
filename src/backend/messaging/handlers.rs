/**
 * Message Handlers
 *
 * - `GET /api/messages/chat/{chat_id}` - paginated history, oldest first
 * - `POST /api/messages` - send a message to a chat
 * - `PUT /api/messages/{message_id}/read` - add the caller's read receipt
 * - `DELETE /api/messages/{message_id}` - delete (sender only)
 * - `GET /api/messages/chat/{chat_id}/unread` - caller's unread count
 *
 * Every route sits behind `auth_middleware`; chat routes require the caller
 * to be the chat's creator or a participant.
 */
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::backend::chat::handlers::access::{ensure_access, load_accessible_chat, parse_id};
use crate::backend::error::BackendError;
use crate::backend::messaging::db::{append_message, Message};
use crate::backend::middleware::{AuthUser, JsonBody};
use crate::backend::server::state::AppState;
use crate::backend::store::{ChatStore, MessageStore};
use crate::shared::messaging::message::normalize_content;
use crate::shared::messaging::{
    Confirmation, ListMessagesResponse, SendMessageRequest, SendMessageResponse,
    UnreadCountResponse,
};
use crate::shared::{PageQuery, Pagination};

/// Default page size of a chat's history
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

/// Get a chat's messages in ascending timestamp order
pub async fn list_chat_messages(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(chat_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ListMessagesResponse>, BackendError> {
    let chat = load_accessible_chat(&state, &chat_id, auth.user.id, "Error fetching messages").await?;
    let page = query.resolve(DEFAULT_HISTORY_LIMIT);

    let (messages, total) = state
        .repository
        .messages_for_chat(chat.id, Some(page))
        .await
        .map_err(|e| BackendError::internal("Error fetching messages", e))?;

    Ok(Json(ListMessagesResponse {
        messages: messages.iter().map(Message::view).collect(),
        pagination: Pagination::new(page, total),
    }))
}

/// Send a message
///
/// The message inherits the chat's session id, or the caller's login
/// session id for chats created without one.
pub async fn send_message(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    JsonBody(request): JsonBody<SendMessageRequest>,
) -> Result<(StatusCode, Json<SendMessageResponse>), BackendError> {
    let (Some(content), Some(chat_id)) = (
        request.content.as_deref().filter(|c| !c.is_empty()),
        request.chat_id.as_deref().filter(|c| !c.is_empty()),
    ) else {
        return Err(BackendError::bad_request("Content and chatId are required"));
    };
    let content = normalize_content(content)?;
    let role = request.role()?;

    let chat = load_accessible_chat(&state, chat_id, auth.user.id, "Error sending message").await?;
    let session_id = chat.session_id.clone().or_else(|| auth.session_id.clone());

    let message = Message::new(content, role, chat.id, session_id, Some(auth.user.id));
    let message = append_message(state.repository.as_ref(), message)
        .await
        .map_err(|e| BackendError::internal("Error sending message", e))?;

    tracing::info!(
        "Message {} sent to chat {} (session {:?})",
        message.id,
        chat.id,
        message.session_id
    );

    Ok((
        StatusCode::CREATED,
        Json(SendMessageResponse {
            message: "Message sent successfully".to_string(),
            message_data: message.view(),
        }),
    ))
}

/// Mark a message as read by the caller
pub async fn mark_as_read(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(message_id): Path<String>,
) -> Result<Json<SendMessageResponse>, BackendError> {
    let id = parse_id(&message_id, "Message not found")?;
    let message = state
        .repository
        .find_message(id)
        .await
        .map_err(|e| BackendError::internal("Error marking message as read", e))?
        .ok_or_else(|| BackendError::not_found("Message not found"))?;

    let chat = state
        .repository
        .find_chat(message.chat_id)
        .await
        .map_err(|e| BackendError::internal("Error marking message as read", e))?
        .ok_or_else(|| BackendError::not_found("Chat not found"))?;
    ensure_access(&chat, auth.user.id)?;

    let message = state
        .repository
        .mark_read(message.id, auth.user.id)
        .await
        .map_err(|e| BackendError::internal("Error marking message as read", e))?;

    Ok(Json(SendMessageResponse {
        message: "Message marked as read".to_string(),
        message_data: message.view(),
    }))
}

/// Delete a message the caller sent
///
/// The chat's message count and last-message preview are left unchanged.
pub async fn delete_message(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(message_id): Path<String>,
) -> Result<Json<Confirmation>, BackendError> {
    let id = parse_id(&message_id, "Message not found")?;
    let message = state
        .repository
        .find_message(id)
        .await
        .map_err(|e| BackendError::internal("Error deleting message", e))?
        .ok_or_else(|| BackendError::not_found("Message not found"))?;

    if message.sender != Some(auth.user.id) {
        tracing::warn!("User {} tried to delete message {}", auth.user.id, message.id);
        return Err(BackendError::forbidden("Only message sender can delete message"));
    }

    state
        .repository
        .delete_message(message.id)
        .await
        .map_err(|e| BackendError::internal("Error deleting message", e))?;

    Ok(Json(Confirmation::new("Message deleted successfully")))
}

/// Count messages in a chat the caller has neither sent nor read
pub async fn unread_count(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(chat_id): Path<String>,
) -> Result<Json<UnreadCountResponse>, BackendError> {
    let chat =
        load_accessible_chat(&state, &chat_id, auth.user.id, "Error fetching unread count").await?;

    let unread_count = state
        .repository
        .count_unread(chat.id, auth.user.id)
        .await
        .map_err(|e| BackendError::internal("Error fetching unread count", e))?;

    Ok(Json(UnreadCountResponse { unread_count }))
}
