/**
 * Chat Records and Database Operations
 *
 * This module defines the stored chat record and the Postgres
 * implementation of `ChatStore`. The last-message preview is stored as
 * three nullable columns; participants as a `UUID[]`.
 */
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::backend::store::postgres::{count, like_pattern};
use crate::backend::store::{ChatFilter, ChatStore, PgRepository, StoreError, StoreResult};
use crate::shared::messaging::chat::title_or_default;
use crate::shared::messaging::{ChatSummary, LastMessage};
use crate::shared::Page;

/// Stored chat
#[derive(Debug, Clone, PartialEq)]
pub struct Chat {
    pub id: Uuid,
    pub title: String,
    pub participants: Vec<Uuid>,
    pub created_by: Option<Uuid>,
    /// Session id passed to the AI service for this chat
    pub session_id: Option<String>,
    pub last_message: Option<LastMessage>,
    pub message_count: i64,
    pub is_active: bool,
    pub metadata: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chat {
    /// A new chat owned by `creator`, who is its only participant
    pub fn new(title: Option<&str>, creator: Option<Uuid>, session_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title_or_default(title),
            participants: creator.into_iter().collect(),
            created_by: creator,
            session_id,
            last_message: None,
            message_count: 0,
            is_active: true,
            metadata: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Participants and the creator may read and write a chat
    pub fn can_access(&self, user_id: Uuid) -> bool {
        self.created_by == Some(user_id) || self.participants.contains(&user_id)
    }

    pub fn is_creator(&self, user_id: Uuid) -> bool {
        self.created_by == Some(user_id)
    }

    pub fn summary(&self) -> ChatSummary {
        ChatSummary {
            id: self.id,
            title: self.title.clone(),
            session_id: self.session_id.clone(),
            last_message: self.last_message.clone(),
            message_count: self.message_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ChatRow {
    id: Uuid,
    title: String,
    participants: Vec<Uuid>,
    created_by: Option<Uuid>,
    session_id: Option<String>,
    last_message_content: Option<String>,
    last_message_at: Option<DateTime<Utc>>,
    last_message_sender: Option<Uuid>,
    message_count: i64,
    is_active: bool,
    metadata: Json<HashMap<String, String>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ChatRow> for Chat {
    fn from(row: ChatRow) -> Self {
        let last_message = match (row.last_message_content, row.last_message_at) {
            (Some(content), Some(timestamp)) => Some(LastMessage {
                content,
                timestamp,
                sender: row.last_message_sender,
            }),
            _ => None,
        };
        Self {
            id: row.id,
            title: row.title,
            participants: row.participants,
            created_by: row.created_by,
            session_id: row.session_id,
            last_message,
            message_count: row.message_count,
            is_active: row.is_active,
            metadata: row.metadata.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const CHAT_COLUMNS: &str = "id, title, participants, created_by, session_id, \
     last_message_content, last_message_at, last_message_sender, message_count, \
     is_active, metadata, created_at, updated_at";

fn push_chat_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ChatFilter) {
    builder.push(" WHERE TRUE");
    if let Some(session_id) = &filter.session_id {
        builder.push(" AND session_id = ").push_bind(session_id.clone());
    }
    if let Some(user_id) = filter.user_id {
        builder
            .push(" AND (created_by = ")
            .push_bind(user_id)
            .push(" OR ")
            .push_bind(user_id)
            .push(" = ANY(participants))");
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        builder.push(" AND title ILIKE ").push_bind(like_pattern(search));
    }
}

async fn insert_chat<'e, E>(executor: E, chat: &Chat) -> StoreResult<Chat>
where
    E: sqlx::PgExecutor<'e>,
{
    let sql = format!(
        "INSERT INTO chats ({CHAT_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING {CHAT_COLUMNS}"
    );
    let last = chat.last_message.as_ref();
    let row = sqlx::query_as::<_, ChatRow>(&sql)
        .bind(chat.id)
        .bind(&chat.title)
        .bind(&chat.participants)
        .bind(chat.created_by)
        .bind(&chat.session_id)
        .bind(last.map(|m| m.content.clone()))
        .bind(last.map(|m| m.timestamp))
        .bind(last.and_then(|m| m.sender))
        .bind(chat.message_count)
        .bind(chat.is_active)
        .bind(Json(&chat.metadata))
        .bind(chat.created_at)
        .bind(chat.updated_at)
        .fetch_one(executor)
        .await?;
    Ok(row.into())
}

impl PgRepository {
    async fn fetch_chat(&self, id: Uuid) -> StoreResult<Chat> {
        self.find_chat(id)
            .await?
            .ok_or_else(|| StoreError::not_found("Chat"))
    }
}

#[async_trait::async_trait]
impl ChatStore for PgRepository {
    async fn create_chat(&self, chat: Chat) -> StoreResult<Chat> {
        insert_chat(&self.pool, &chat).await
    }

    async fn find_chat(&self, id: Uuid) -> StoreResult<Option<Chat>> {
        let sql = format!("SELECT {CHAT_COLUMNS} FROM chats WHERE id = $1");
        let row = sqlx::query_as::<_, ChatRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Chat::from))
    }

    async fn find_or_create_chat_by_title(&self, title: &str) -> StoreResult<Chat> {
        let mut tx = self.pool.begin().await?;
        // Held until commit; concurrent callers for the same title queue here
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(title)
            .execute(&mut *tx)
            .await?;

        let sql = format!(
            "SELECT {CHAT_COLUMNS} FROM chats WHERE title = $1 ORDER BY created_at ASC LIMIT 1"
        );
        let existing = sqlx::query_as::<_, ChatRow>(&sql)
            .bind(title)
            .fetch_optional(&mut *tx)
            .await?;
        let chat = match existing {
            Some(row) => Chat::from(row),
            None => insert_chat(&mut *tx, &Chat::new(Some(title), None, None)).await?,
        };

        tx.commit().await?;
        Ok(chat)
    }

    async fn chats_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Chat>> {
        let sql = format!(
            "SELECT {CHAT_COLUMNS} FROM chats \
             WHERE created_by = $1 OR $1 = ANY(participants) \
             ORDER BY updated_at DESC"
        );
        let rows = sqlx::query_as::<_, ChatRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Chat::from).collect())
    }

    async fn update_chat_title(&self, id: Uuid, title: &str) -> StoreResult<Chat> {
        let sql = format!(
            "UPDATE chats SET title = $1, updated_at = NOW() WHERE id = $2 RETURNING {CHAT_COLUMNS}"
        );
        sqlx::query_as::<_, ChatRow>(&sql)
            .bind(title)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Chat::from)
            .ok_or_else(|| StoreError::not_found("Chat"))
    }

    async fn add_participant(&self, id: Uuid, user_id: Uuid) -> StoreResult<Chat> {
        let sql = format!(
            "UPDATE chats SET participants = array_append(participants, $1), updated_at = NOW() \
             WHERE id = $2 AND NOT ($1 = ANY(participants)) RETURNING {CHAT_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, ChatRow>(&sql)
            .bind(user_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match updated {
            Some(row) => Ok(row.into()),
            // Already a participant, or no such chat
            None => self.fetch_chat(id).await,
        }
    }

    async fn record_last_message(&self, id: Uuid, last: LastMessage) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE chats SET last_message_content = $1, last_message_at = $2, \
             last_message_sender = $3, message_count = message_count + 1, updated_at = NOW() \
             WHERE id = $4",
        )
        .bind(&last.content)
        .bind(last.timestamp)
        .bind(last.sender)
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Chat"));
        }
        Ok(())
    }

    async fn delete_chat(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM chats WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_chats(&self, filter: &ChatFilter, page: Page) -> StoreResult<(Vec<Chat>, u64)> {
        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {CHAT_COLUMNS} FROM chats"));
        push_chat_filter(&mut query, filter);
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(i64::from(page.limit))
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);
        let rows = query.build_query_as::<ChatRow>().fetch_all(&self.pool).await?;

        let mut total = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM chats");
        push_chat_filter(&mut total, filter);
        let total: i64 = total.build_query_scalar().fetch_one(&self.pool).await?;

        Ok((rows.into_iter().map(Chat::from).collect(), count(total)))
    }

    async fn chats_by_session(&self, session_id: &str) -> StoreResult<Vec<Chat>> {
        let sql = format!(
            "SELECT {CHAT_COLUMNS} FROM chats WHERE session_id = $1 ORDER BY created_at ASC"
        );
        let rows = sqlx::query_as::<_, ChatRow>(&sql)
            .bind(session_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Chat::from).collect())
    }

    async fn count_chats(&self, since: Option<DateTime<Utc>>) -> StoreResult<u64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM chats WHERE $1::timestamptz IS NULL OR created_at >= $1",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(count(total))
    }

    async fn count_chat_sessions(&self) -> StoreResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT session_id) FROM chats")
            .fetch_one(&self.pool)
            .await?;
        Ok(count(total))
    }
}
