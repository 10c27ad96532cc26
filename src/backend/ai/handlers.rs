/**
 * AI Proxy Handlers
 *
 * - `POST /api/ai/stream` relays the AI service's chunked body as it
 *   arrives, or streams the simulated reply when the service fails.
 * - `POST /api/ai/chat` returns the whole answer as JSON.
 *
 * Both resolve the session id sent upstream from the chat named by
 * `chatId`, so each chat keeps its own conversation context.
 */
use axum::{
    body::Body,
    extract::State,
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE},
        HeaderName,
    },
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::ai::fallback::{simulated_reply_text, simulated_stream, simulated_stream_text};
use crate::backend::ai::upstream::AiQuery;
use crate::backend::auth::sessions::generate_session_id;
use crate::backend::error::BackendError;
use crate::backend::middleware::JsonBody;
use crate::backend::server::state::AppState;
use crate::backend::store::ChatStore;

const X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

/// Body of both AI endpoints
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AiRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub image_data: Option<String>,
}

impl AiRequest {
    fn message(&self) -> Result<&str, BackendError> {
        match self.message.as_deref() {
            Some(message) if !message.is_empty() => Ok(message),
            _ => Err(BackendError::bad_request("Message is required")),
        }
    }

    fn query(&self, message: &str) -> AiQuery {
        AiQuery::new(message, self.image_data.clone())
    }
}

/// Where a `/chat` answer came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnswerSource {
    /// The AI service answered
    #[serde(rename = "fastapi")]
    Upstream,
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiChatResponse {
    pub success: bool,
    pub response: String,
    pub timestamp: DateTime<Utc>,
    pub source: AnswerSource,
}

/// Session id to send upstream for a request.
///
/// The chat's own session id when `chat_id` names a chat that has one,
/// otherwise a freshly generated id.
pub async fn resolve_session_id(state: &AppState, chat_id: Option<&str>) -> String {
    let Some(raw) = chat_id.filter(|id| !id.is_empty()) else {
        let session_id = generate_session_id();
        tracing::info!("[AI] No chatId provided, using generated session ID: {}", session_id);
        return session_id;
    };

    let chat = match Uuid::parse_str(raw) {
        Ok(id) => state.repository.find_chat(id).await.unwrap_or_else(|e| {
            tracing::error!("[AI] Failed to look up chat {}: {}", id, e);
            None
        }),
        Err(_) => None,
    };

    match chat.and_then(|chat| chat.session_id) {
        Some(session_id) => {
            tracing::info!("[AI] Using chat-specific session ID: {}", session_id);
            session_id
        }
        None => {
            let session_id = generate_session_id();
            tracing::info!("[AI] Chat {} has no session, using generated ID: {}", raw, session_id);
            session_id
        }
    }
}

fn streaming_response(body: Body) -> Response {
    (
        [
            (CONTENT_TYPE, "text/plain"),
            (CACHE_CONTROL, "no-cache"),
            (X_ACCEL_BUFFERING, "no"),
        ],
        body,
    )
        .into_response()
}

/// Stream an AI answer (POST /api/ai/stream)
pub async fn stream_handler(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<AiRequest>,
) -> Result<Response, BackendError> {
    let message = request.message()?;
    let session_id = resolve_session_id(&state, request.chat_id.as_deref()).await;

    match state.ai.open(&session_id, &request.query(message)).await {
        Ok(upstream) => {
            tracing::info!("[AI] Upstream accepted, relaying stream");
            Ok(streaming_response(Body::from_stream(upstream.bytes_stream())))
        }
        Err(e) => {
            tracing::warn!("[AI] Proxy failed, using fallback: {}", e);
            let text = simulated_stream_text(message);
            let frames = simulated_stream(text, state.config.fallback_pacing);
            Ok(streaming_response(Body::from_stream(frames)))
        }
    }
}

/// Get a complete AI answer (POST /api/ai/chat)
pub async fn chat_handler(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<AiRequest>,
) -> Result<Json<AiChatResponse>, BackendError> {
    let message = request.message()?;
    let session_id = resolve_session_id(&state, request.chat_id.as_deref()).await;

    let (response, source) = match state.ai.collect(&session_id, &request.query(message)).await {
        Ok(answer) => (answer, AnswerSource::Upstream),
        Err(e) => {
            tracing::warn!("[AI] Proxy failed, using fallback: {}", e);
            (simulated_reply_text(message), AnswerSource::Fallback)
        }
    };

    Ok(Json(AiChatResponse {
        success: true,
        response,
        timestamp: Utc::now(),
        source,
    }))
}
