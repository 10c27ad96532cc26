//! Message Wire Types
//!
//! Represents a single message inside a chat, as returned by the messages
//! API, plus the request bodies that create messages.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::{Pagination, SharedError};

/// Author role of a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Written by a human participant
    #[default]
    User,
    /// Produced by the AI service
    Assistant,
    /// Generated by the application itself
    System,
}

impl Role {
    /// Database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            "system" => Ok(Role::System),
            other => Err(SharedError::InvalidRole(other.to_string())),
        }
    }
}

/// Record of a user having read a message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReadReceipt {
    /// Reader
    pub user: Uuid,
    /// When the message was marked as read
    pub read_at: DateTime<Utc>,
}

/// File attached to a message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: u64,
    pub url: String,
}

/// Full message view returned by the messages API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: Uuid,
    pub content: String,
    pub role: Role,
    pub chat_id: Uuid,
    /// Chat session the message belongs to (used for AI conversation isolation)
    pub session_id: Option<String>,
    pub sender: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
    pub read_by: Vec<ReadReceipt>,
    pub attachments: Vec<Attachment>,
    pub metadata: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Send message request (POST /api/messages)
///
/// `chatId` and `role` stay strings here so malformed values are reported
/// by the handler with the API's own error messages.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl SendMessageRequest {
    /// Requested role, `user` when absent
    pub fn role(&self) -> Result<Role, SharedError> {
        match self.role.as_deref() {
            None => Ok(Role::default()),
            Some(role) => role.parse(),
        }
    }
}

/// A message together with a confirmation (send and mark-as-read)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub message: String,
    pub message_data: MessageView,
}

/// Messages of a chat (GET /api/messages/chat/{chat_id})
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMessagesResponse {
    pub messages: Vec<MessageView>,
    pub pagination: Pagination,
}

/// Unread count (GET /api/messages/chat/{chat_id}/unread)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub unread_count: u64,
}

/// Validate and normalise message content.
///
/// Content is trimmed; content that is empty after trimming is rejected.
pub fn normalize_content(content: &str) -> Result<String, SharedError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(SharedError::EmptyContent);
    }
    Ok(trimmed.to_string())
}
