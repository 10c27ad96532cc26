/**
 * WebSocket Relay
 *
 * `GET /ws` upgrades to a WebSocket speaking JSON text frames
 * `{"event": "<name>", "data": <payload>}` (see `shared::event`).
 *
 * # Connection Model
 *
 * Each connection owns a `SocketSession`:
 * - an outbound queue drained by a writer task into the socket,
 * - one forwarder task per joined room, copying room events (except the
 *   connection's own) into the outbound queue.
 *
 * Dropping the session aborts its forwarders, which releases the room
 * subscriptions so the periodic sweep can remove empty rooms.
 *
 * # Events
 *
 * - `join-chat` / `leave-chat` - subscribe / unsubscribe a room
 * - `message` - store the message, update the chat preview, relay to the room
 * - `typing` / `stop-typing` - relay the payload to `payload.chatId`
 *
 * Failures are reported to the sender only, as `error {message}` frames.
 */
use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::backend::chat::db::Chat;
use crate::backend::messaging::db::{append_message, Message};
use crate::backend::realtime::rooms::{ConnectionId, RoomEnvelope, RoomRegistry};
use crate::backend::server::state::AppState;
use crate::backend::store::{ChatStore, Repository, StoreError};
use crate::shared::event::{typing_room, DEFAULT_ROOM};
use crate::shared::messaging::message::normalize_content;
use crate::shared::{ClientEvent, IncomingMessage, RelayedMessage, ServerEvent, SharedError};

/// Title of the chat that `chatId: "default"` resolves to
pub const DEFAULT_ROOM_TITLE: &str = "Default Chat";

/// Outbound frames buffered per connection
const OUTBOUND_CAPACITY: usize = 256;

/// Handle a WebSocket upgrade (GET /ws)
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<ServerEvent>(OUTBOUND_CAPACITY);

    let mut session = SocketSession::new(
        state.rooms.clone(),
        state.repository.clone(),
        outbound_tx,
    );
    let connection = session.id();
    tracing::info!("[Socket] Connection {} opened", connection);

    let writer = tokio::spawn(async move {
        while let Some(event) = outbound_rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("[Socket] Failed to serialize event: {:?}", e);
                    continue;
                }
            };
            if sink.send(WsMessage::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(WsMessage::Text(text)) => session.handle_text(text.as_str()).await,
            Ok(WsMessage::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!("[Socket] Connection {} read error: {}", connection, e);
                break;
            }
        }
    }

    drop(session);
    writer.abort();
    tracing::info!("[Socket] Connection {} closed", connection);
}

/// State of one WebSocket connection
pub struct SocketSession {
    id: ConnectionId,
    rooms: RoomRegistry,
    repository: Arc<dyn Repository>,
    outbound: mpsc::Sender<ServerEvent>,
    joined: HashMap<String, JoinHandle<()>>,
}

impl SocketSession {
    pub fn new(
        rooms: RoomRegistry,
        repository: Arc<dyn Repository>,
        outbound: mpsc::Sender<ServerEvent>,
    ) -> Self {
        Self {
            id: rooms.next_connection_id(),
            rooms,
            repository,
            outbound,
            joined: HashMap::new(),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Rooms this connection has joined
    pub fn joined_rooms(&self) -> Vec<String> {
        let mut rooms: Vec<String> = self.joined.keys().cloned().collect();
        rooms.sort();
        rooms
    }

    /// Parse and handle one text frame
    pub async fn handle_text(&mut self, text: &str) {
        match serde_json::from_str::<ClientEvent>(text) {
            Ok(event) => self.handle_event(event).await,
            Err(e) => {
                let error = SharedError::from(e);
                tracing::warn!("[Socket] Connection {}: {}", self.id, error);
                self.send_error(error.client_message()).await;
            }
        }
    }

    pub async fn handle_event(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::JoinChat(room) => self.join(room),
            ClientEvent::LeaveChat(room) => self.leave(&room),
            ClientEvent::Message(incoming) => {
                if let Err(message) = self.relay_message(incoming).await {
                    self.send_error(message).await;
                }
            }
            ClientEvent::Typing(payload) => self.relay_typing(payload, false).await,
            ClientEvent::StopTyping(payload) => self.relay_typing(payload, true).await,
        }
    }

    /// Subscribe to a room; joining twice is a no-op
    pub fn join(&mut self, room: String) {
        if self.joined.contains_key(&room) {
            return;
        }
        let rx = self.rooms.subscribe(&room);
        let forwarder = tokio::spawn(forward_room(
            room.clone(),
            self.id,
            rx,
            self.outbound.clone(),
        ));
        tracing::info!("[Socket] Connection {} joined chat {}", self.id, room);
        self.joined.insert(room, forwarder);
    }

    pub fn leave(&mut self, room: &str) {
        if let Some(forwarder) = self.joined.remove(room) {
            forwarder.abort();
            tracing::info!("[Socket] Connection {} left chat {}", self.id, room);
        }
    }

    async fn relay_message(&self, incoming: IncomingMessage) -> Result<(), String> {
        let content = normalize_content(&incoming.content).map_err(|e| e.client_message())?;
        let chat = self.resolve_chat(&incoming.chat_id).await?;

        let message = Message::new(content, incoming.role, chat.id, chat.session_id.clone(), None);
        let message = append_message(self.repository.as_ref(), message)
            .await
            .map_err(|e| {
                tracing::error!("[Socket] Error handling message: {}", e);
                "Error sending message".to_string()
            })?;

        let relayed = ServerEvent::Message(RelayedMessage {
            id: message.id,
            content: message.content,
            role: message.role,
            timestamp: message.timestamp,
            chat_id: chat.id,
        });
        let delivered = self.rooms.broadcast(&chat.id.to_string(), self.id, relayed);
        tracing::info!(
            "[Socket] Message {} saved and relayed to {} subscribers",
            message.id,
            delivered
        );
        Ok(())
    }

    /// Resolve a room id from a `message` event to a stored chat
    async fn resolve_chat(&self, chat_id: &str) -> Result<Chat, String> {
        let lookup_failed = |e: StoreError| {
            tracing::error!("[Socket] Chat lookup failed: {}", e);
            "Error sending message".to_string()
        };

        if chat_id == DEFAULT_ROOM {
            return self
                .repository
                .find_or_create_chat_by_title(DEFAULT_ROOM_TITLE)
                .await
                .map_err(lookup_failed);
        }

        let id = Uuid::parse_str(chat_id).map_err(|_| "Chat not found".to_string())?;
        self.repository
            .find_chat(id)
            .await
            .map_err(lookup_failed)?
            .ok_or_else(|| "Chat not found".to_string())
    }

    async fn relay_typing(&self, payload: serde_json::Value, stopped: bool) {
        let Some(room) = typing_room(&payload) else {
            self.send_error("chatId is required".to_string()).await;
            return;
        };
        let event = if stopped {
            ServerEvent::StopTyping(payload)
        } else {
            ServerEvent::Typing(payload)
        };
        self.rooms.broadcast(&room, self.id, event);
    }

    async fn send_error(&self, message: String) {
        if self
            .outbound
            .send(ServerEvent::Error { message })
            .await
            .is_err()
        {
            tracing::debug!("[Socket] Connection {} is gone; dropping error frame", self.id);
        }
    }
}

impl Drop for SocketSession {
    fn drop(&mut self) {
        for (_, forwarder) in self.joined.drain() {
            forwarder.abort();
        }
    }
}

/// Copy room events produced by other connections into a connection's queue
async fn forward_room(
    room: String,
    connection: ConnectionId,
    mut rx: broadcast::Receiver<RoomEnvelope>,
    outbound: mpsc::Sender<ServerEvent>,
) {
    loop {
        match rx.recv().await {
            Ok(envelope) => {
                if envelope.origin == connection {
                    continue;
                }
                if outbound.send(envelope.event).await.is_err() {
                    return;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(
                    "[Socket] Connection {} lagged in {}, skipped {} events",
                    connection,
                    room,
                    skipped
                );
            }
            Err(broadcast::error::RecvError::Closed) => return,
        }
    }
}
