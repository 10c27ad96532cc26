//! Real-time Relay Module
//!
//! WebSocket relay for chat rooms. Clients connect to `/ws`, join rooms by
//! chat id and exchange `message`, `typing` and `stop-typing` events with
//! everyone else in the room.
//!
//! # Architecture
//!
//! - **`rooms`** - per-room broadcast channels and connection ids
//! - **`socket`** - the WebSocket upgrade handler and per-connection session
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs     - Module exports and documentation
//! ├── rooms.rs   - Room broadcast registry
//! └── socket.rs  - WebSocket connection handling
//! ```
//!
//! # Delivery
//!
//! Events are delivered to every connection in the room except the one that
//! produced them. Errors are sent back to the producing connection only.
//! Nothing is replayed: a connection sees events published after it joined.

pub mod rooms;
pub mod socket;

pub use rooms::{RoomEnvelope, RoomRegistry, ROOM_CAPACITY};
pub use socket::{ws_handler, SocketSession, DEFAULT_ROOM_TITLE};
