/**
 * Admin Handlers
 *
 * Read-only dashboards over every user, chat and message, plus JSON/CSV
 * exports. Any authenticated user may use them.
 *
 * - `GET /api/admin/chats` - chats, newest first, filterable
 * - `GET /api/admin/messages` - messages, newest first, filterable
 * - `GET /api/admin/users` - users, newest first, searchable
 * - `GET /api/admin/chats/{chat_id}` - one chat with all its messages
 * - `GET /api/admin/export/chat/{chat_id}` - chat export
 * - `GET /api/admin/export/session/{session_id}` - session export
 * - `GET /api/admin/stats` - totals and last-7-days activity
 */
use std::collections::{HashMap, HashSet};

use axum::{
    extract::{Path, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Json, Response},
};
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::backend::admin::export::{chat_csv, session_csv};
use crate::backend::admin::types::{
    non_empty, optional_id, AdminChatView, AdminChatsResponse, AdminMessageView,
    AdminMessagesResponse, AdminUsersResponse, ChatDetailResponse, ChatMessageView, ChatRef,
    ChatsQuery, ExportFormat, ExportQuery, MessagesQuery, RecentActivity, SessionExport,
    StatsResponse, UsersQuery,
};
use crate::backend::chat::db::Chat;
use crate::backend::chat::handlers::access::load_chat;
use crate::backend::error::BackendError;
use crate::backend::messaging::db::Message;
use crate::backend::server::state::AppState;
use crate::backend::store::{
    ChatFilter, ChatStore, MessageFilter, MessageStore, StoreError, UserFilter, UserStore,
};
use crate::shared::messaging::{Role, UserRef};
use crate::shared::Pagination;

/// Window of the "recent activity" counters
const RECENT_DAYS: i64 = 7;

/// Users referenced by a set of records, keyed by id
async fn user_refs(
    state: &AppState,
    ids: impl IntoIterator<Item = Uuid>,
    failure: &'static str,
) -> Result<HashMap<Uuid, UserRef>, BackendError> {
    let ids: Vec<Uuid> = ids.into_iter().collect::<HashSet<_>>().into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let users = state
        .repository
        .find_users(&ids)
        .await
        .map_err(|e| BackendError::internal(failure, e))?;
    Ok(users.iter().map(|u| (u.id, u.user_ref())).collect())
}

fn chat_user_ids(chats: &[Chat]) -> impl Iterator<Item = Uuid> + '_ {
    chats
        .iter()
        .flat_map(|chat| chat.created_by.into_iter().chain(chat.participants.iter().copied()))
}

fn chat_view(chat: &Chat, users: &HashMap<Uuid, UserRef>) -> AdminChatView {
    AdminChatView {
        id: chat.id,
        title: chat.title.clone(),
        session_id: chat.session_id.clone(),
        created_by: chat.created_by.and_then(|id| users.get(&id).cloned()),
        participants: chat
            .participants
            .iter()
            .filter_map(|id| users.get(id).cloned())
            .collect(),
        last_message: chat.last_message.clone(),
        message_count: chat.message_count,
        is_active: chat.is_active,
        created_at: chat.created_at,
        updated_at: chat.updated_at,
    }
}

fn message_view(
    message: &Message,
    chats: &HashMap<Uuid, ChatRef>,
    users: &HashMap<Uuid, UserRef>,
) -> AdminMessageView {
    AdminMessageView {
        id: message.id,
        content: message.content.clone(),
        role: message.role,
        chat: chats.get(&message.chat_id).cloned(),
        session_id: message.session_id.clone(),
        sender: message.sender.and_then(|id| users.get(&id).cloned()),
        timestamp: message.timestamp,
        is_read: message.is_read,
        created_at: message.created_at,
    }
}

fn chat_message_views(messages: &[Message], users: &HashMap<Uuid, UserRef>) -> Vec<ChatMessageView> {
    messages
        .iter()
        .map(|m| ChatMessageView::new(m, m.sender.and_then(|id| users.get(&id).cloned())))
        .collect()
}

/// Attach a download filename to an export body
fn attachment(format: ExportFormat, name: &str, body: impl IntoResponse) -> Response {
    let disposition = format!("attachment; filename=\"{}.{}\"", name, format.extension());
    (
        [
            (CONTENT_TYPE, format.content_type().to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

pub async fn list_chats(
    State(state): State<AppState>,
    Query(query): Query<ChatsQuery>,
) -> Result<Json<AdminChatsResponse>, BackendError> {
    let page = query.page();
    let filter = ChatFilter {
        session_id: non_empty(&query.session_id).map(str::to_string),
        user_id: optional_id(&query.user_id, "userId")?,
        search: non_empty(&query.search).map(str::to_string),
    };

    let (chats, total) = state
        .repository
        .list_chats(&filter, page)
        .await
        .map_err(|e| BackendError::internal("Error fetching chats", e))?;
    let users = user_refs(&state, chat_user_ids(&chats), "Error fetching chats").await?;

    Ok(Json(AdminChatsResponse {
        chats: chats.iter().map(|chat| chat_view(chat, &users)).collect(),
        pagination: Pagination::new(page, total),
    }))
}

pub async fn list_messages(
    State(state): State<AppState>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<AdminMessagesResponse>, BackendError> {
    let page = query.page();
    let role = non_empty(&query.role).map(str::parse::<Role>).transpose()?;
    let filter = MessageFilter {
        chat_id: optional_id(&query.chat_id, "chatId")?,
        session_id: non_empty(&query.session_id).map(str::to_string),
        user_id: optional_id(&query.user_id, "userId")?,
        role,
    };

    let (messages, total) = state
        .repository
        .list_messages(&filter, page)
        .await
        .map_err(|e| BackendError::internal("Error fetching messages", e))?;

    let mut chats = HashMap::new();
    for chat_id in messages.iter().map(|m| m.chat_id).collect::<HashSet<_>>() {
        let chat = state
            .repository
            .find_chat(chat_id)
            .await
            .map_err(|e| BackendError::internal("Error fetching messages", e))?;
        if let Some(chat) = chat {
            chats.insert(chat.id, ChatRef::of(&chat));
        }
    }
    let users = user_refs(
        &state,
        messages.iter().filter_map(|m| m.sender),
        "Error fetching messages",
    )
    .await?;

    Ok(Json(AdminMessagesResponse {
        messages: messages.iter().map(|m| message_view(m, &chats, &users)).collect(),
        pagination: Pagination::new(page, total),
    }))
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UsersQuery>,
) -> Result<Json<AdminUsersResponse>, BackendError> {
    let page = query.page();
    let filter = UserFilter {
        search: non_empty(&query.search).map(str::to_string),
    };

    let (users, total) = state
        .repository
        .list_users(&filter, page)
        .await
        .map_err(|e| BackendError::internal("Error fetching users", e))?;

    Ok(Json(AdminUsersResponse {
        users: users.iter().map(|u| u.public()).collect(),
        pagination: Pagination::new(page, total),
    }))
}

/// Chat with populated users and all messages in ascending order
async fn chat_detail(
    state: &AppState,
    chat_id: &str,
    failure: &'static str,
) -> Result<(ChatDetailResponse, Vec<Message>), BackendError> {
    let chat = load_chat(state, chat_id, failure).await?;
    let (messages, _) = state
        .repository
        .messages_for_chat(chat.id, None)
        .await
        .map_err(|e| BackendError::internal(failure, e))?;

    let ids = chat_user_ids(std::slice::from_ref(&chat)).chain(messages.iter().filter_map(|m| m.sender));
    let users = user_refs(state, ids, failure).await?;

    let detail = ChatDetailResponse {
        chat: chat_view(&chat, &users),
        messages: chat_message_views(&messages, &users),
    };
    Ok((detail, messages))
}

pub async fn get_chat_detail(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Result<Json<ChatDetailResponse>, BackendError> {
    let (detail, _) = chat_detail(&state, &chat_id, "Error fetching chat details").await?;
    Ok(Json(detail))
}

pub async fn export_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, BackendError> {
    let format = query.format()?;
    let (detail, messages) = chat_detail(&state, &chat_id, "Error exporting chat").await?;
    let name = detail.chat.id.to_string();

    tracing::info!("Exporting chat {} as {}", name, format);
    Ok(match format {
        ExportFormat::Json => attachment(format, &name, Json(detail)),
        ExportFormat::Csv => {
            let csv = chat_csv(&messages).map_err(|e| BackendError::internal("Error exporting chat", e))?;
            attachment(format, &name, csv)
        }
    })
}

pub async fn export_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, BackendError> {
    let format = query.format()?;
    let chats = state
        .repository
        .chats_by_session(&session_id)
        .await
        .map_err(|e| BackendError::internal("Error exporting session", e))?;
    if chats.is_empty() {
        return Err(BackendError::not_found("Session not found"));
    }

    let chat_ids: Vec<Uuid> = chats.iter().map(|c| c.id).collect();
    let messages = state
        .repository
        .messages_for_chats(&chat_ids)
        .await
        .map_err(|e| BackendError::internal("Error exporting session", e))?;

    let ids = chat_user_ids(&chats).chain(messages.iter().filter_map(|m| m.sender));
    let users = user_refs(&state, ids, "Error exporting session").await?;

    tracing::info!(
        "Exporting session {} ({} chats, {} messages) as {}",
        session_id,
        chats.len(),
        messages.len(),
        format
    );

    match format {
        ExportFormat::Json => {
            let chat_refs: HashMap<Uuid, ChatRef> = chats.iter().map(|c| (c.id, ChatRef::of(c))).collect();
            let export = SessionExport {
                session_id: session_id.clone(),
                chats: chats.iter().map(|chat| chat_view(chat, &users)).collect(),
                messages: messages.iter().map(|m| message_view(m, &chat_refs, &users)).collect(),
            };
            Ok(attachment(format, &session_id, Json(export)))
        }
        ExportFormat::Csv => {
            let titles: HashMap<Uuid, String> = chats.iter().map(|c| (c.id, c.title.clone())).collect();
            let senders: HashMap<Uuid, String> =
                users.values().map(|u| (u.id, u.username.clone())).collect();
            let csv = session_csv(&messages, &titles, &senders)
                .map_err(|e| BackendError::internal("Error exporting session", e))?;
            Ok(attachment(format, &session_id, csv))
        }
    }
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, BackendError> {
    let failed = |e: StoreError| BackendError::internal("Error fetching statistics", e);
    let since = Utc::now() - Duration::days(RECENT_DAYS);
    let repository = &state.repository;

    Ok(Json(StatsResponse {
        total_users: repository.count_users(None).await.map_err(failed)?,
        total_chats: repository.count_chats(None).await.map_err(failed)?,
        total_messages: repository.count_messages(None).await.map_err(failed)?,
        total_sessions: repository.count_chat_sessions().await.map_err(failed)?,
        recent_activity: RecentActivity {
            users: repository.count_users(Some(since)).await.map_err(failed)?,
            chats: repository.count_chats(Some(since)).await.map_err(failed)?,
            messages: repository.count_messages(Some(since)).await.map_err(failed)?,
        },
    }))
}
