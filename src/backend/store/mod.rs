//! Storage Module
//!
//! Persistence is hidden behind four async traits, one per collection:
//!
//! - **`UserStore`** - accounts
//! - **`SessionStore`** - login sessions
//! - **`ChatStore`** - chats and their last-message preview
//! - **`MessageStore`** - messages and read receipts
//!
//! Anything implementing all four is a [`Repository`]. Two backends exist:
//! [`PgRepository`] (Postgres, selected when `DATABASE_URL` is set) and
//! [`MemoryRepository`] (process memory, used for local runs and tests).
//!
//! The Postgres implementations live next to the records they store
//! (`auth::users`, `auth::sessions`, `chat::db`, `messaging::db`).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::backend::auth::sessions::LoginSession;
use crate::backend::auth::users::User;
use crate::backend::chat::db::Chat;
use crate::backend::messaging::db::Message;
use crate::shared::config::AppConfig;
use crate::shared::messaging::{LastMessage, Role};
use crate::shared::Page;

pub mod memory;
pub mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The addressed record does not exist
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// A uniqueness constraint was violated
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored JSON document could not be decoded
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Filters of the admin chat listing
#[derive(Debug, Clone, Default)]
pub struct ChatFilter {
    pub session_id: Option<String>,
    /// Creator or participant
    pub user_id: Option<Uuid>,
    /// Case-insensitive substring of the title
    pub search: Option<String>,
}

/// Filters of the admin message listing
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    pub chat_id: Option<Uuid>,
    pub session_id: Option<String>,
    /// Sender
    pub user_id: Option<Uuid>,
    pub role: Option<Role>,
}

/// Filters of the admin user listing
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Case-insensitive substring of username or mobile
    pub search: Option<String>,
}

#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; `Conflict` when the username or mobile is taken
    async fn create_user(&self, user: User) -> StoreResult<User>;
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_mobile(&self, mobile: &str) -> StoreResult<Option<User>>;
    /// Whether any user has this username or this mobile number
    async fn user_exists(&self, username: &str, mobile: &str) -> StoreResult<bool>;
    /// Set the online flag and bump `last_seen`
    async fn set_user_online(&self, id: Uuid, online: bool) -> StoreResult<()>;
    async fn find_users(&self, ids: &[Uuid]) -> StoreResult<Vec<User>>;
    /// Newest first
    async fn list_users(&self, filter: &UserFilter, page: Page) -> StoreResult<(Vec<User>, u64)>;
    /// Users created at or after `since` (all users when `None`)
    async fn count_users(&self, since: Option<DateTime<Utc>>) -> StoreResult<u64>;
}

#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(&self, session: LoginSession) -> StoreResult<LoginSession>;
    async fn find_session(&self, session_id: &str) -> StoreResult<Option<LoginSession>>;
    /// Deactivate a session; returns false when it was unknown or already ended
    async fn end_session(&self, session_id: &str) -> StoreResult<bool>;
}

#[async_trait::async_trait]
pub trait ChatStore: Send + Sync {
    async fn create_chat(&self, chat: Chat) -> StoreResult<Chat>;
    async fn find_chat(&self, id: Uuid) -> StoreResult<Option<Chat>>;
    /// Oldest chat with exactly this title, created without a creator when
    /// none exists. Concurrent callers get the same chat.
    async fn find_or_create_chat_by_title(&self, title: &str) -> StoreResult<Chat>;
    /// Chats the user created or participates in, most recently updated first
    async fn chats_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Chat>>;
    async fn update_chat_title(&self, id: Uuid, title: &str) -> StoreResult<Chat>;
    /// Add a participant unless already present
    async fn add_participant(&self, id: Uuid, user_id: Uuid) -> StoreResult<Chat>;
    /// Replace the last-message preview and increment the message count
    async fn record_last_message(&self, id: Uuid, last: LastMessage) -> StoreResult<()>;
    async fn delete_chat(&self, id: Uuid) -> StoreResult<bool>;
    /// Newest first
    async fn list_chats(&self, filter: &ChatFilter, page: Page) -> StoreResult<(Vec<Chat>, u64)>;
    async fn chats_by_session(&self, session_id: &str) -> StoreResult<Vec<Chat>>;
    async fn count_chats(&self, since: Option<DateTime<Utc>>) -> StoreResult<u64>;
    /// Number of distinct non-null chat session ids
    async fn count_chat_sessions(&self) -> StoreResult<u64>;
}

#[async_trait::async_trait]
pub trait MessageStore: Send + Sync {
    async fn create_message(&self, message: Message) -> StoreResult<Message>;
    async fn find_message(&self, id: Uuid) -> StoreResult<Option<Message>>;
    /// Messages of a chat in ascending timestamp order plus the chat's total;
    /// `None` returns every message
    async fn messages_for_chat(
        &self,
        chat_id: Uuid,
        page: Option<Page>,
    ) -> StoreResult<(Vec<Message>, u64)>;
    /// Messages of several chats in ascending timestamp order
    async fn messages_for_chats(&self, chat_ids: &[Uuid]) -> StoreResult<Vec<Message>>;
    /// Append a receipt for `user_id` unless one exists and set `is_read`
    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> StoreResult<Message>;
    async fn delete_message(&self, id: Uuid) -> StoreResult<bool>;
    async fn delete_chat_messages(&self, chat_id: Uuid) -> StoreResult<u64>;
    /// Messages not sent by `user_id` without a receipt from `user_id`
    async fn count_unread(&self, chat_id: Uuid, user_id: Uuid) -> StoreResult<u64>;
    /// Newest timestamp first
    async fn list_messages(
        &self,
        filter: &MessageFilter,
        page: Page,
    ) -> StoreResult<(Vec<Message>, u64)>;
    async fn count_messages(&self, since: Option<DateTime<Utc>>) -> StoreResult<u64>;
}

/// A complete storage backend
pub trait Repository: UserStore + SessionStore + ChatStore + MessageStore {
    /// Backend name for logs and the health endpoint
    fn backend_name(&self) -> &'static str;
}

/// Select the repository for a configuration.
///
/// `DATABASE_URL` set: connect to Postgres and run migrations, failing when
/// either step fails. Unset: an empty in-memory repository.
pub async fn create_repository(config: &AppConfig) -> StoreResult<Arc<dyn Repository>> {
    match &config.database_url {
        Some(url) => {
            let repository = PgRepository::connect(url, config.database_max_connections).await?;
            repository.migrate().await?;
            Ok(Arc::new(repository) as Arc<dyn Repository>)
        }
        None => {
            tracing::warn!("DATABASE_URL not set. Using the in-memory store; data is lost on restart.");
            Ok(Arc::new(MemoryRepository::new()) as Arc<dyn Repository>)
        }
    }
}
