//! Chat Backend Module
//!
//! Chats are conversation containers owned by their creator. Each chat
//! carries its own session id, which is sent to the AI service so that
//! conversations in different chats do not share context.
//!
//! # Architecture
//!
//! - **`db`** - Chat record and the Postgres `ChatStore`
//! - **`handlers`** - `/api/chats` handlers and access checks

/// Chat record and database operations
pub mod db;

/// HTTP handlers
pub mod handlers;

pub use db::Chat;
