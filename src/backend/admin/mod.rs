//! Admin Module
//!
//! Dashboards and exports over all stored data. The routes sit behind
//! `auth_middleware` and are open to every authenticated user.
//!
//! - **`types`** - Query parameters and populated views
//! - **`export`** - CSV layouts of chat and session exports
//! - **`handlers`** - `/api/admin` handlers

pub mod export;
pub mod handlers;
pub mod types;

pub use handlers::{
    export_chat, export_session, get_chat_detail, list_chats, list_messages, list_users, stats,
};
