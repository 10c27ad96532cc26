//! Messaging Module
//!
//! Messages inside chats: the stored record, its Postgres `MessageStore`,
//! and the `/api/messages` handlers.
//!
//! - **`db`** - Message record, read receipts, `append_message`
//! - **`handlers`** - HTTP handlers

pub mod db;
pub mod handlers;

pub use db::{append_message, Message};
pub use handlers::{delete_message, list_chat_messages, mark_as_read, send_message, unread_count};
