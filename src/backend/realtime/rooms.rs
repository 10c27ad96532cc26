/**
 * Chat Rooms
 *
 * Per-room broadcast channels for the WebSocket relay. Every room id (a
 * chat id, or any string a client joins) gets its own
 * `tokio::sync::broadcast` channel so events never cross rooms.
 *
 * Each event is wrapped in a `RoomEnvelope` carrying the id of the
 * connection that produced it; subscribers skip their own events, which
 * gives "everyone in the room except the sender" delivery.
 *
 * Channels are created on first use and removed by
 * `cleanup_inactive_channels` once nobody is subscribed.
 */
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;

use crate::shared::ServerEvent;

/// Buffered events per room before slow subscribers start lagging
pub const ROOM_CAPACITY: usize = 100;

/// Identifies one WebSocket connection
pub type ConnectionId = u64;

/// An event published to a room
#[derive(Debug, Clone)]
pub struct RoomEnvelope {
    /// Connection that produced the event
    pub origin: ConnectionId,
    pub event: ServerEvent,
}

/// Registry of room broadcast channels
#[derive(Clone, Default)]
pub struct RoomRegistry {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<RoomEnvelope>>>>,
    next_connection: Arc<AtomicU64>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn channels(&self) -> MutexGuard<'_, HashMap<String, broadcast::Sender<RoomEnvelope>>> {
        // The map stays consistent even if a holder panicked
        self.channels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Allocate an id for a new connection
    pub fn next_connection_id(&self) -> ConnectionId {
        self.next_connection.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Subscribe to a room, creating its channel if needed
    pub fn subscribe(&self, room: &str) -> broadcast::Receiver<RoomEnvelope> {
        let mut channels = self.channels();
        channels
            .entry(room.to_string())
            .or_insert_with(|| broadcast::channel(ROOM_CAPACITY).0)
            .subscribe()
    }

    /// Publish an event to a room
    ///
    /// Returns the number of subscribers that received it (0 if nobody is
    /// in the room). The origin's own subscription is included in the count.
    pub fn broadcast(&self, room: &str, origin: ConnectionId, event: ServerEvent) -> usize {
        let sender = match self.channels().get(room) {
            Some(sender) => sender.clone(),
            None => {
                tracing::debug!("[Rooms] No channel for room {}", room);
                return 0;
            }
        };
        match sender.send(RoomEnvelope { origin, event }) {
            Ok(subscriber_count) => {
                tracing::debug!("[Rooms] Event sent to {} subscribers of {}", subscriber_count, room);
                subscriber_count
            }
            Err(_) => {
                tracing::debug!("[Rooms] No subscribers in room {}", room);
                0
            }
        }
    }

    /// Remove channels without subscribers; returns how many were removed
    pub fn cleanup_inactive_channels(&self) -> usize {
        let mut channels = self.channels();
        let before = channels.len();
        channels.retain(|_, sender| sender.receiver_count() > 0);
        before - channels.len()
    }

    /// Subscriber count for a room (0 for unknown rooms)
    pub fn subscriber_count(&self, room: &str) -> usize {
        self.channels()
            .get(room)
            .map_or(0, |sender| sender.receiver_count())
    }

    /// Number of rooms with a live channel
    pub fn room_count(&self) -> usize {
        self.channels().len()
    }
}
