/**
 * Admin Views
 *
 * Query parameters and response bodies of `/api/admin`. Admin views
 * populate referenced users and chats instead of returning bare ids.
 */
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::chat::db::Chat;
use crate::backend::error::BackendError;
use crate::backend::messaging::db::Message;
use crate::shared::messaging::{LastMessage, PublicUser, Role, UserRef};
use crate::shared::{Page, Pagination};

/// `GET /api/admin/chats` query
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub session_id: Option<String>,
    pub user_id: Option<String>,
    pub search: Option<String>,
}

/// `GET /api/admin/messages` query
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub chat_id: Option<String>,
    pub session_id: Option<String>,
    pub user_id: Option<String>,
    pub role: Option<String>,
}

/// `GET /api/admin/users` query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsersQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}

impl ChatsQuery {
    pub fn page(&self) -> Page {
        Page::resolve(self.page, self.limit, 20)
    }
}

impl MessagesQuery {
    pub fn page(&self) -> Page {
        Page::resolve(self.page, self.limit, 50)
    }
}

impl UsersQuery {
    pub fn page(&self) -> Page {
        Page::resolve(self.page, self.limit, 20)
    }
}

/// Drop empty query values
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Parse an optional id query parameter
pub fn optional_id(value: &Option<String>, name: &str) -> Result<Option<Uuid>, BackendError> {
    non_empty(value)
        .map(|raw| {
            Uuid::parse_str(raw).map_err(|_| BackendError::bad_request(format!("Invalid {}", name)))
        })
        .transpose()
}

/// Export format query (`?format=json|csv`, default json)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(BackendError::bad_request("Unsupported format")),
        }
    }
}

impl ExportQuery {
    pub fn format(&self) -> Result<ExportFormat, BackendError> {
        self.format.as_deref().map_or(Ok(ExportFormat::Json), str::parse)
    }
}

/// Chat with creator and participants populated
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminChatView {
    pub id: Uuid,
    pub title: String,
    pub session_id: Option<String>,
    pub created_by: Option<UserRef>,
    pub participants: Vec<UserRef>,
    pub last_message: Option<LastMessage>,
    pub message_count: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Chat reference inside admin message views
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatRef {
    pub id: Uuid,
    pub title: String,
    pub session_id: Option<String>,
}

impl ChatRef {
    pub fn of(chat: &Chat) -> Self {
        Self {
            id: chat.id,
            title: chat.title.clone(),
            session_id: chat.session_id.clone(),
        }
    }
}

/// Message with its chat and sender populated
///
/// `chat` is `None` when the chat no longer exists; `sender` is `None` for
/// assistant replies and socket-relayed messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminMessageView {
    pub id: Uuid,
    pub content: String,
    pub role: Role,
    #[serde(rename = "chatId")]
    pub chat: Option<ChatRef>,
    pub session_id: Option<String>,
    pub sender: Option<UserRef>,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Message inside a single chat's detail or export
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageView {
    pub id: Uuid,
    pub content: String,
    pub role: Role,
    pub sender: Option<UserRef>,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl ChatMessageView {
    pub fn new(message: &Message, sender: Option<UserRef>) -> Self {
        Self {
            id: message.id,
            content: message.content.clone(),
            role: message.role,
            sender,
            timestamp: message.timestamp,
            is_read: message.is_read,
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminChatsResponse {
    pub chats: Vec<AdminChatView>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminMessagesResponse {
    pub messages: Vec<AdminMessageView>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUsersResponse {
    pub users: Vec<PublicUser>,
    pub pagination: Pagination,
}

/// Chat detail, also the JSON chat export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatDetailResponse {
    pub chat: AdminChatView,
    pub messages: Vec<ChatMessageView>,
}

/// JSON session export
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExport {
    pub session_id: String,
    pub chats: Vec<AdminChatView>,
    pub messages: Vec<AdminMessageView>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RecentActivity {
    pub users: u64,
    pub chats: u64,
    pub messages: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_users: u64,
    pub total_chats: u64,
    pub total_messages: u64,
    pub total_sessions: u64,
    pub recent_activity: RecentActivity,
}
