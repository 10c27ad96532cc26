/**
 * WebSocket Event Envelopes
 *
 * Frames exchanged over `GET /ws` are JSON text frames of the form
 * `{"event": "<name>", "data": <payload>}`. Event names follow the
 * kebab-case names the browser client already emits (`join-chat`,
 * `stop-typing`, ...).
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::messaging::Role;

/// Room id that resolves to the shared "Default Chat"
pub const DEFAULT_ROOM: &str = "default";

/// Event sent by a client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Subscribe to a chat room
    JoinChat(String),
    /// Unsubscribe from a chat room
    LeaveChat(String),
    /// Persist a message and relay it to the room
    Message(IncomingMessage),
    /// Relay a typing indicator (payload must carry `chatId`)
    Typing(serde_json::Value),
    /// Relay the end of a typing indicator (payload must carry `chatId`)
    StopTyping(serde_json::Value),
}

/// Message payload of a client `message` event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IncomingMessage {
    /// Chat id, or `"default"` for the shared default chat
    pub chat_id: String,
    pub content: String,
    #[serde(default)]
    pub role: Role,
}

/// Event sent by the server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// A message stored by another member of the room
    Message(RelayedMessage),
    Typing(serde_json::Value),
    StopTyping(serde_json::Value),
    /// Failure while handling one of this connection's frames
    Error { message: String },
}

/// Message payload of a server `message` event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RelayedMessage {
    pub id: Uuid,
    pub content: String,
    pub role: Role,
    pub timestamp: DateTime<Utc>,
    pub chat_id: Uuid,
}

/// Extract the room id carried by a typing payload
pub fn typing_room(payload: &serde_json::Value) -> Option<String> {
    match payload.get("chatId")? {
        serde_json::Value::String(id) if !id.is_empty() => Some(id.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
