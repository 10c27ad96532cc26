/**
 * Message Records and Database Operations
 *
 * This module defines the stored message record and the Postgres
 * implementation of `MessageStore`. Read receipts, attachments and
 * metadata are JSONB documents.
 */
use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::backend::store::postgres::count;
use crate::backend::store::{
    ChatStore, MessageFilter, MessageStore, PgRepository, Repository, StoreError, StoreResult,
};
use crate::shared::messaging::{Attachment, LastMessage, MessageView, ReadReceipt, Role};
use crate::shared::Page;

/// Stored message
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: Uuid,
    /// Trimmed, non-empty
    pub content: String,
    pub role: Role,
    pub chat_id: Uuid,
    pub session_id: Option<String>,
    /// `None` for socket-relayed and generated messages
    pub sender: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
    pub read_by: Vec<ReadReceipt>,
    pub metadata: HashMap<String, String>,
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Message {
    /// A new unread message stamped with the current time
    pub fn new(
        content: String,
        role: Role,
        chat_id: Uuid,
        session_id: Option<String>,
        sender: Option<Uuid>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            content,
            role,
            chat_id,
            session_id,
            sender,
            timestamp: now,
            is_read: false,
            read_by: Vec::new(),
            metadata: HashMap::new(),
            attachments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `user_id` has a read receipt on this message
    pub fn is_read_by(&self, user_id: Uuid) -> bool {
        self.read_by.iter().any(|receipt| receipt.user == user_id)
    }

    /// Append a receipt for `user_id` unless one exists; returns whether it changed
    pub fn mark_read_by(&mut self, user_id: Uuid) -> bool {
        if self.is_read_by(user_id) {
            return false;
        }
        let now = Utc::now();
        self.read_by.push(ReadReceipt {
            user: user_id,
            read_at: now,
        });
        self.is_read = true;
        self.updated_at = now;
        true
    }

    /// Counted as unread for `user_id`
    pub fn is_unread_for(&self, user_id: Uuid) -> bool {
        self.sender != Some(user_id) && !self.is_read_by(user_id)
    }

    pub fn view(&self) -> MessageView {
        MessageView {
            id: self.id,
            content: self.content.clone(),
            role: self.role,
            chat_id: self.chat_id,
            session_id: self.session_id.clone(),
            sender: self.sender,
            timestamp: self.timestamp,
            is_read: self.is_read,
            read_by: self.read_by.clone(),
            attachments: self.attachments.clone(),
            metadata: self.metadata.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    content: String,
    role: String,
    chat_id: Uuid,
    session_id: Option<String>,
    sender: Option<Uuid>,
    timestamp: DateTime<Utc>,
    is_read: bool,
    read_by: Json<Vec<ReadReceipt>>,
    metadata: Json<HashMap<String, String>>,
    attachments: Json<Vec<Attachment>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MessageRow> for Message {
    type Error = StoreError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let role = Role::from_str(&row.role)
            .map_err(|e| StoreError::Corrupt(format!("message {}: {}", row.id, e)))?;
        Ok(Self {
            id: row.id,
            content: row.content,
            role,
            chat_id: row.chat_id,
            session_id: row.session_id,
            sender: row.sender,
            timestamp: row.timestamp,
            is_read: row.is_read,
            read_by: row.read_by.0,
            metadata: row.metadata.0,
            attachments: row.attachments.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Store a message and make it its chat's last message
pub async fn append_message(repository: &dyn Repository, message: Message) -> StoreResult<Message> {
    let message = repository.create_message(message).await?;
    repository
        .record_last_message(
            message.chat_id,
            LastMessage {
                content: message.content.clone(),
                timestamp: message.timestamp,
                sender: message.sender,
            },
        )
        .await?;
    Ok(message)
}

fn into_messages(rows: Vec<MessageRow>) -> StoreResult<Vec<Message>> {
    rows.into_iter().map(Message::try_from).collect()
}

const MESSAGE_COLUMNS: &str = "id, content, role, chat_id, session_id, sender, timestamp, \
     is_read, read_by, metadata, attachments, created_at, updated_at";

fn push_message_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &MessageFilter) {
    builder.push(" WHERE TRUE");
    if let Some(chat_id) = filter.chat_id {
        builder.push(" AND chat_id = ").push_bind(chat_id);
    }
    if let Some(session_id) = &filter.session_id {
        builder.push(" AND session_id = ").push_bind(session_id.clone());
    }
    if let Some(user_id) = filter.user_id {
        builder.push(" AND sender = ").push_bind(user_id);
    }
    if let Some(role) = filter.role {
        builder.push(" AND role = ").push_bind(role.as_str());
    }
}

#[async_trait::async_trait]
impl MessageStore for PgRepository {
    async fn create_message(&self, message: Message) -> StoreResult<Message> {
        let sql = format!(
            "INSERT INTO messages ({MESSAGE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING {MESSAGE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(message.id)
            .bind(&message.content)
            .bind(message.role.as_str())
            .bind(message.chat_id)
            .bind(&message.session_id)
            .bind(message.sender)
            .bind(message.timestamp)
            .bind(message.is_read)
            .bind(Json(&message.read_by))
            .bind(Json(&message.metadata))
            .bind(Json(&message.attachments))
            .bind(message.created_at)
            .bind(message.updated_at)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn find_message(&self, id: Uuid) -> StoreResult<Option<Message>> {
        let sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1");
        sqlx::query_as::<_, MessageRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Message::try_from)
            .transpose()
    }

    async fn messages_for_chat(
        &self,
        chat_id: Uuid,
        page: Option<Page>,
    ) -> StoreResult<(Vec<Message>, u64)> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE chat_id = "
        ));
        query
            .push_bind(chat_id)
            .push(" ORDER BY timestamp ASC, created_at ASC");
        if let Some(page) = page {
            query
                .push(" LIMIT ")
                .push_bind(i64::from(page.limit))
                .push(" OFFSET ")
                .push_bind(page.offset() as i64);
        }
        let rows = query
            .build_query_as::<MessageRow>()
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE chat_id = $1")
            .bind(chat_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((into_messages(rows)?, count(total)))
    }

    async fn messages_for_chats(&self, chat_ids: &[Uuid]) -> StoreResult<Vec<Message>> {
        if chat_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE chat_id = ANY($1) \
             ORDER BY timestamp ASC, created_at ASC"
        );
        let rows = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(chat_ids)
            .fetch_all(&self.pool)
            .await?;
        into_messages(rows)
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> StoreResult<Message> {
        // Conditional append keeps one receipt per user under concurrent requests
        let sql = format!(
            "UPDATE messages \
             SET read_by = read_by || jsonb_build_array(jsonb_build_object('user', $2::uuid, 'readAt', to_jsonb(NOW()))), \
                 is_read = TRUE, updated_at = NOW() \
             WHERE id = $1 AND NOT (read_by @> jsonb_build_array(jsonb_build_object('user', $2::uuid))) \
             RETURNING {MESSAGE_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        match updated {
            Some(row) => row.try_into(),
            None => self
                .find_message(id)
                .await?
                .ok_or_else(|| StoreError::not_found("Message")),
        }
    }

    async fn delete_message(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_chat_messages(&self, chat_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM messages WHERE chat_id = $1")
            .bind(chat_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn count_unread(&self, chat_id: Uuid, user_id: Uuid) -> StoreResult<u64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages \
             WHERE chat_id = $1 \
               AND sender IS DISTINCT FROM $2 \
               AND NOT (read_by @> jsonb_build_array(jsonb_build_object('user', $2::uuid)))",
        )
        .bind(chat_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count(total))
    }

    async fn list_messages(
        &self,
        filter: &MessageFilter,
        page: Page,
    ) -> StoreResult<(Vec<Message>, u64)> {
        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {MESSAGE_COLUMNS} FROM messages"));
        push_message_filter(&mut query, filter);
        query
            .push(" ORDER BY timestamp DESC LIMIT ")
            .push_bind(i64::from(page.limit))
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);
        let rows = query
            .build_query_as::<MessageRow>()
            .fetch_all(&self.pool)
            .await?;

        let mut total = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM messages");
        push_message_filter(&mut total, filter);
        let total: i64 = total.build_query_scalar().fetch_one(&self.pool).await?;

        Ok((into_messages(rows)?, count(total)))
    }

    async fn count_messages(&self, since: Option<DateTime<Utc>>) -> StoreResult<u64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages WHERE $1::timestamptz IS NULL OR created_at >= $1",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(count(total))
    }
}
