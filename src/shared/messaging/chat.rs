//! Chat Wire Types
//!
//! Represents a chat (a conversation container) as seen by clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Preview of the most recent message in a chat
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LastMessage {
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// `None` for assistant replies and socket-relayed messages
    pub sender: Option<Uuid>,
}

/// Chat summary returned by the chats API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    pub id: Uuid,
    pub title: String,
    /// Chat-scoped session id passed to the AI service
    pub session_id: Option<String>,
    pub last_message: Option<LastMessage>,
    pub message_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create chat request (POST /api/chats)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateChatRequest {
    #[serde(default)]
    pub title: Option<String>,
}

/// Update chat request (PUT /api/chats/{chat_id})
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateChatRequest {
    #[serde(default)]
    pub title: Option<String>,
}

/// Add participant request (POST /api/chats/{chat_id}/participants)
///
/// `user_id` stays raw so ownership is checked before the id is parsed.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AddParticipantRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Response carrying a single chat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub chat: ChatSummary,
}

/// Response carrying the caller's chats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListChatsResponse {
    pub chats: Vec<ChatSummary>,
}

/// Title used for chats created without one
pub const DEFAULT_CHAT_TITLE: &str = "New Chat";

/// Resolve the title for a new chat
pub fn title_or_default(title: Option<&str>) -> String {
    match title.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => DEFAULT_CHAT_TITLE.to_string(),
    }
}
