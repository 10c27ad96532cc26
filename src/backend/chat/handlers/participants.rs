/**
 * Participant Handler
 *
 * `POST /api/chats/{chat_id}/participants` adds a user to a chat. Only the
 * creator may add participants; adding someone twice is a no-op.
 */
use axum::{
    extract::{Path, State},
    response::Json,
};

use crate::backend::chat::handlers::access::{load_owned_chat, parse_id};
use crate::backend::error::BackendError;
use crate::backend::middleware::{AuthUser, JsonBody};
use crate::backend::server::state::AppState;
use crate::backend::store::{ChatStore, UserStore};
use crate::shared::messaging::{AddParticipantRequest, ChatResponse};

pub async fn add_participant(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(chat_id): Path<String>,
    JsonBody(request): JsonBody<AddParticipantRequest>,
) -> Result<Json<ChatResponse>, BackendError> {
    let chat = load_owned_chat(
        &state,
        &chat_id,
        auth.user.id,
        "Only chat creator can add participants",
        "Error adding participant",
    )
    .await?;

    let user_id = parse_id(request.user_id.as_deref().unwrap_or_default(), "User not found")?;
    let participant = state
        .repository
        .find_user(user_id)
        .await
        .map_err(|e| BackendError::internal("Error adding participant", e))?
        .ok_or_else(|| BackendError::not_found("User not found"))?;

    let chat = state
        .repository
        .add_participant(chat.id, participant.id)
        .await
        .map_err(|e| BackendError::internal("Error adding participant", e))?;

    tracing::info!("User {} added to chat {}", participant.username, chat.id);
    Ok(Json(ChatResponse {
        message: Some("Participant added successfully".to_string()),
        chat: chat.summary(),
    }))
}
