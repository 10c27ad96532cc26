/**
 * Chat CRUD Handlers
 *
 * - `GET /api/chats` - chats the caller created or participates in
 * - `POST /api/chats` - create a chat with its own AI session id
 * - `GET /api/chats/{chat_id}` - one chat (creator or participant)
 * - `PUT /api/chats/{chat_id}` - rename (creator only)
 * - `DELETE /api/chats/{chat_id}` - delete with its messages (creator only)
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::backend::auth::sessions::generate_session_id;
use crate::backend::chat::db::Chat;
use crate::backend::chat::handlers::access::{load_accessible_chat, load_owned_chat};
use crate::backend::error::BackendError;
use crate::backend::middleware::{AuthUser, JsonBody};
use crate::backend::server::state::AppState;
use crate::backend::store::{ChatStore, MessageStore};
use crate::shared::messaging::{
    ChatResponse, Confirmation, CreateChatRequest, ListChatsResponse, UpdateChatRequest,
};

/// List the caller's chats, most recently updated first
pub async fn list_chats(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> Result<Json<ListChatsResponse>, BackendError> {
    let chats = state
        .repository
        .chats_for_user(auth.user.id)
        .await
        .map_err(|e| BackendError::internal("Error fetching chats", e))?;

    Ok(Json(ListChatsResponse {
        chats: chats.iter().map(Chat::summary).collect(),
    }))
}

/// Create a chat
///
/// The token must carry a login session. The chat gets a freshly generated
/// session id so its AI conversation is isolated from the caller's other
/// chats.
pub async fn create_chat(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    JsonBody(request): JsonBody<CreateChatRequest>,
) -> Result<(StatusCode, Json<ChatResponse>), BackendError> {
    let Some(login_session) = auth.session_id.as_deref() else {
        tracing::warn!("Chat creation without login session by {}", auth.user.id);
        return Err(BackendError::bad_request("Invalid session. Please login again."));
    };

    let chat_session = generate_session_id();
    let chat = Chat::new(request.title.as_deref(), Some(auth.user.id), Some(chat_session));
    let chat = state
        .repository
        .create_chat(chat)
        .await
        .map_err(|e| BackendError::internal("Error creating chat", e))?;

    tracing::info!(
        "Chat {} created by {} (login session {}, chat session {:?})",
        chat.id,
        auth.user.username,
        login_session,
        chat.session_id
    );

    Ok((
        StatusCode::CREATED,
        Json(ChatResponse {
            message: Some("Chat created successfully".to_string()),
            chat: chat.summary(),
        }),
    ))
}

pub async fn get_chat(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(chat_id): Path<String>,
) -> Result<Json<ChatResponse>, BackendError> {
    let chat = load_accessible_chat(&state, &chat_id, auth.user.id, "Error fetching chat").await?;
    Ok(Json(ChatResponse {
        message: None,
        chat: chat.summary(),
    }))
}

/// Rename a chat; a missing or blank title keeps the current one
pub async fn update_chat(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(chat_id): Path<String>,
    JsonBody(request): JsonBody<UpdateChatRequest>,
) -> Result<Json<ChatResponse>, BackendError> {
    let chat = load_owned_chat(
        &state,
        &chat_id,
        auth.user.id,
        "Only chat creator can update chat",
        "Error updating chat",
    )
    .await?;

    let title = request
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(&chat.title);

    let chat = state
        .repository
        .update_chat_title(chat.id, title)
        .await
        .map_err(|e| BackendError::internal("Error updating chat", e))?;

    Ok(Json(ChatResponse {
        message: Some("Chat updated successfully".to_string()),
        chat: chat.summary(),
    }))
}

/// Delete a chat and all of its messages
pub async fn delete_chat(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(chat_id): Path<String>,
) -> Result<Json<Confirmation>, BackendError> {
    let chat = load_owned_chat(
        &state,
        &chat_id,
        auth.user.id,
        "Only chat creator can delete chat",
        "Error deleting chat",
    )
    .await?;

    let removed = state
        .repository
        .delete_chat_messages(chat.id)
        .await
        .map_err(|e| BackendError::internal("Error deleting chat", e))?;
    state
        .repository
        .delete_chat(chat.id)
        .await
        .map_err(|e| BackendError::internal("Error deleting chat", e))?;

    tracing::info!("Chat {} deleted with {} messages", chat.id, removed);
    Ok(Json(Confirmation::new("Chat deleted successfully")))
}
