/**
 * In-Memory Repository
 *
 * Process-local storage used when no database is configured and by the
 * test suite. Collections live behind a single `RwLock`. Each trait call
 * takes the lock once, so a message and its chat preview are written by
 * two separate calls. Like the Postgres foreign keys, messages need an
 * existing chat and are removed together with it.
 */
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::auth::sessions::LoginSession;
use crate::backend::auth::users::User;
use crate::backend::chat::db::Chat;
use crate::backend::messaging::db::Message;
use crate::backend::store::{
    ChatFilter, ChatStore, MessageFilter, MessageStore, Repository, SessionStore, StoreError,
    StoreResult, UserFilter, UserStore,
};
use crate::shared::messaging::LastMessage;
use crate::shared::Page;

#[derive(Default)]
struct Collections {
    users: HashMap<Uuid, User>,
    sessions: HashMap<String, LoginSession>,
    chats: HashMap<Uuid, Chat>,
    /// Insertion order doubles as the tie-break for equal timestamps
    messages: Vec<Message>,
}

/// Repository keeping everything in process memory
#[derive(Default)]
pub struct MemoryRepository {
    inner: RwLock<Collections>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Repository for MemoryRepository {
    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn since_matches(created_at: DateTime<Utc>, since: Option<DateTime<Utc>>) -> bool {
    since.map_or(true, |since| created_at >= since)
}

/// Slice one page out of an already ordered list
fn paginate<T: Clone>(items: &[T], page: Page) -> Vec<T> {
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    items
        .iter()
        .skip(offset)
        .take(page.limit as usize)
        .cloned()
        .collect()
}

fn chat_matches(chat: &Chat, filter: &ChatFilter) -> bool {
    if let Some(session_id) = &filter.session_id {
        if chat.session_id.as_ref() != Some(session_id) {
            return false;
        }
    }
    if let Some(user_id) = filter.user_id {
        if !chat.can_access(user_id) {
            return false;
        }
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        if !contains_ci(&chat.title, search) {
            return false;
        }
    }
    true
}

fn message_matches(message: &Message, filter: &MessageFilter) -> bool {
    filter.chat_id.map_or(true, |id| message.chat_id == id)
        && filter
            .session_id
            .as_ref()
            .map_or(true, |sid| message.session_id.as_ref() == Some(sid))
        && filter.user_id.map_or(true, |id| message.sender == Some(id))
        && filter.role.map_or(true, |role| message.role == role)
}

#[async_trait::async_trait]
impl UserStore for MemoryRepository {
    async fn create_user(&self, user: User) -> StoreResult<User> {
        let mut inner = self.inner.write().await;
        if inner
            .users
            .values()
            .any(|u| u.username == user.username || u.mobile == user.mobile)
        {
            return Err(StoreError::Conflict(
                "username or mobile already registered".to_string(),
            ));
        }
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_mobile(&self, mobile: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.mobile == mobile).cloned())
    }

    async fn user_exists(&self, username: &str, mobile: &str) -> StoreResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .any(|u| u.username == username || u.mobile == mobile))
    }

    async fn set_user_online(&self, id: Uuid, online: bool) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("User"))?;
        let now = Utc::now();
        user.is_online = online;
        user.last_seen = now;
        user.updated_at = now;
        Ok(())
    }

    async fn find_users(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        let inner = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| inner.users.get(id).cloned())
            .collect())
    }

    async fn list_users(&self, filter: &UserFilter, page: Page) -> StoreResult<(Vec<User>, u64)> {
        let inner = self.inner.read().await;
        let mut users: Vec<User> = inner
            .users
            .values()
            .filter(|u| match filter.search.as_deref().filter(|s| !s.is_empty()) {
                Some(search) => contains_ci(&u.username, search) || contains_ci(&u.mobile, search),
                None => true,
            })
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok((paginate(&users, page), users.len() as u64))
    }

    async fn count_users(&self, since: Option<DateTime<Utc>>) -> StoreResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .filter(|u| since_matches(u.created_at, since))
            .count() as u64)
    }
}

#[async_trait::async_trait]
impl SessionStore for MemoryRepository {
    async fn create_session(&self, session: LoginSession) -> StoreResult<LoginSession> {
        let mut inner = self.inner.write().await;
        if inner.sessions.contains_key(&session.session_id) {
            return Err(StoreError::Conflict("session id already exists".to_string()));
        }
        inner
            .sessions
            .insert(session.session_id.clone(), session.clone());
        Ok(session)
    }

    async fn find_session(&self, session_id: &str) -> StoreResult<Option<LoginSession>> {
        Ok(self.inner.read().await.sessions.get(session_id).cloned())
    }

    async fn end_session(&self, session_id: &str) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        match inner.sessions.get_mut(session_id) {
            Some(session) if session.is_active => {
                let now = Utc::now();
                session.is_active = false;
                session.logout_time = Some(now);
                session.last_activity = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait::async_trait]
impl ChatStore for MemoryRepository {
    async fn create_chat(&self, chat: Chat) -> StoreResult<Chat> {
        self.inner.write().await.chats.insert(chat.id, chat.clone());
        Ok(chat)
    }

    async fn find_chat(&self, id: Uuid) -> StoreResult<Option<Chat>> {
        Ok(self.inner.read().await.chats.get(&id).cloned())
    }

    async fn find_or_create_chat_by_title(&self, title: &str) -> StoreResult<Chat> {
        let mut inner = self.inner.write().await;
        if let Some(chat) = inner
            .chats
            .values()
            .filter(|c| c.title == title)
            .min_by_key(|c| c.created_at)
        {
            return Ok(chat.clone());
        }
        let chat = Chat::new(Some(title), None, None);
        inner.chats.insert(chat.id, chat.clone());
        Ok(chat)
    }

    async fn chats_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Chat>> {
        let inner = self.inner.read().await;
        let mut chats: Vec<Chat> = inner
            .chats
            .values()
            .filter(|c| c.can_access(user_id))
            .cloned()
            .collect();
        chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(chats)
    }

    async fn update_chat_title(&self, id: Uuid, title: &str) -> StoreResult<Chat> {
        let mut inner = self.inner.write().await;
        let chat = inner
            .chats
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Chat"))?;
        chat.title = title.to_string();
        chat.updated_at = Utc::now();
        Ok(chat.clone())
    }

    async fn add_participant(&self, id: Uuid, user_id: Uuid) -> StoreResult<Chat> {
        let mut inner = self.inner.write().await;
        let chat = inner
            .chats
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Chat"))?;
        if !chat.participants.contains(&user_id) {
            chat.participants.push(user_id);
            chat.updated_at = Utc::now();
        }
        Ok(chat.clone())
    }

    async fn record_last_message(&self, id: Uuid, last: LastMessage) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let chat = inner
            .chats
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Chat"))?;
        chat.last_message = Some(last);
        chat.message_count += 1;
        chat.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_chat(&self, id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let removed = inner.chats.remove(&id).is_some();
        inner.messages.retain(|m| m.chat_id != id);
        Ok(removed)
    }

    async fn list_chats(&self, filter: &ChatFilter, page: Page) -> StoreResult<(Vec<Chat>, u64)> {
        let inner = self.inner.read().await;
        let mut chats: Vec<Chat> = inner
            .chats
            .values()
            .filter(|c| chat_matches(c, filter))
            .cloned()
            .collect();
        chats.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok((paginate(&chats, page), chats.len() as u64))
    }

    async fn chats_by_session(&self, session_id: &str) -> StoreResult<Vec<Chat>> {
        let inner = self.inner.read().await;
        let mut chats: Vec<Chat> = inner
            .chats
            .values()
            .filter(|c| c.session_id.as_deref() == Some(session_id))
            .cloned()
            .collect();
        chats.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(chats)
    }

    async fn count_chats(&self, since: Option<DateTime<Utc>>) -> StoreResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner
            .chats
            .values()
            .filter(|c| since_matches(c.created_at, since))
            .count() as u64)
    }

    async fn count_chat_sessions(&self) -> StoreResult<u64> {
        let inner = self.inner.read().await;
        let mut sessions: Vec<&str> = inner
            .chats
            .values()
            .filter_map(|c| c.session_id.as_deref())
            .collect();
        sessions.sort_unstable();
        sessions.dedup();
        Ok(sessions.len() as u64)
    }
}

#[async_trait::async_trait]
impl MessageStore for MemoryRepository {
    async fn create_message(&self, message: Message) -> StoreResult<Message> {
        let mut inner = self.inner.write().await;
        if !inner.chats.contains_key(&message.chat_id) {
            return Err(StoreError::not_found("Chat"));
        }
        inner.messages.push(message.clone());
        Ok(message)
    }

    async fn find_message(&self, id: Uuid) -> StoreResult<Option<Message>> {
        let inner = self.inner.read().await;
        Ok(inner.messages.iter().find(|m| m.id == id).cloned())
    }

    async fn messages_for_chat(
        &self,
        chat_id: Uuid,
        page: Option<Page>,
    ) -> StoreResult<(Vec<Message>, u64)> {
        let inner = self.inner.read().await;
        let mut messages: Vec<Message> = inner
            .messages
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        let total = messages.len() as u64;
        let messages = match page {
            Some(page) => paginate(&messages, page),
            None => messages,
        };
        Ok((messages, total))
    }

    async fn messages_for_chats(&self, chat_ids: &[Uuid]) -> StoreResult<Vec<Message>> {
        let inner = self.inner.read().await;
        let mut messages: Vec<Message> = inner
            .messages
            .iter()
            .filter(|m| chat_ids.contains(&m.chat_id))
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(messages)
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> StoreResult<Message> {
        let mut inner = self.inner.write().await;
        let message = inner
            .messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| StoreError::not_found("Message"))?;
        message.mark_read_by(user_id);
        Ok(message.clone())
    }

    async fn delete_message(&self, id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.messages.len();
        inner.messages.retain(|m| m.id != id);
        Ok(inner.messages.len() < before)
    }

    async fn delete_chat_messages(&self, chat_id: Uuid) -> StoreResult<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.messages.len();
        inner.messages.retain(|m| m.chat_id != chat_id);
        Ok((before - inner.messages.len()) as u64)
    }

    async fn count_unread(&self, chat_id: Uuid, user_id: Uuid) -> StoreResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner
            .messages
            .iter()
            .filter(|m| m.chat_id == chat_id && m.is_unread_for(user_id))
            .count() as u64)
    }

    async fn list_messages(
        &self,
        filter: &MessageFilter,
        page: Page,
    ) -> StoreResult<(Vec<Message>, u64)> {
        let inner = self.inner.read().await;
        let mut messages: Vec<Message> = inner
            .messages
            .iter()
            .filter(|m| message_matches(m, filter))
            .cloned()
            .collect();
        messages.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok((paginate(&messages, page), messages.len() as u64))
    }

    async fn count_messages(&self, since: Option<DateTime<Utc>>) -> StoreResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner
            .messages
            .iter()
            .filter(|m| since_matches(m.created_at, since))
            .count() as u64)
    }
}
