//! Messaging Module
//!
//! Data structures of the chat system as they travel over the wire:
//!
//! - `PublicUser` / `UserRef` - user views
//! - `ChatSummary` - a chat with its last-message preview
//! - `MessageView` - a message with read receipts and attachments
//!
//! # Usage
//!
//! ```rust
//! use askveda::shared::messaging::{ChatSummary, MessageView, PublicUser, Role};
//! ```

pub mod chat;
pub mod message;
pub mod user;

// Re-export all types
pub use chat::{
    AddParticipantRequest, ChatResponse, ChatSummary, CreateChatRequest, LastMessage,
    ListChatsResponse, UpdateChatRequest, DEFAULT_CHAT_TITLE,
};
pub use message::{
    Attachment, ListMessagesResponse, MessageView, ReadReceipt, Role, SendMessageRequest,
    SendMessageResponse, UnreadCountResponse,
};
pub use user::{PublicUser, UserRef};

use serde::{Deserialize, Serialize};

/// Response body carrying only a confirmation message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Confirmation {
    pub message: String,
}

impl Confirmation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
