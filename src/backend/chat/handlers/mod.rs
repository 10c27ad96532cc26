//! Chat Handlers Module
//!
//! Axum handlers for the `/api/chats` endpoints. Every route sits behind
//! `auth_middleware`.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs          - Module exports and documentation
//! ├── access.rs       - Chat lookup and permission checks
//! ├── crud.rs         - List, create, get, update, delete
//! └── participants.rs - Add participant
//! ```
//!
//! # Permissions
//!
//! - Reading a chat requires being its creator or a participant
//! - Updating, deleting and adding participants require being the creator

/// Chat lookup and permission checks
pub mod access;

/// Chat CRUD handlers
pub mod crud;

/// Participant handler
pub mod participants;

pub use crud::{create_chat, delete_chat, get_chat, list_chats, update_chat};
pub use participants::add_participant;
