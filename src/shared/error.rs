//! Shared Error Types
//!
//! Rejections of client input detected by the wire types themselves:
//! message content, roles and socket frames. The backend wraps them in
//! `BackendError`; all of them are client mistakes and map to
//! `400 Bad Request`.
//!
//! # Usage
//!
//! ```rust
//! use askveda::shared::error::SharedError;
//!
//! let error = SharedError::InvalidRole("moderator".to_string());
//! assert_eq!(error.client_message(), "Invalid role 'moderator'. Expected user, assistant or system");
//! ```
use thiserror::Error;

/// Invalid client input
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// Message content was blank after trimming
    #[error("Content cannot be empty")]
    EmptyContent,

    /// Role other than user, assistant or system
    #[error("Invalid role '{0}'. Expected user, assistant or system")]
    InvalidRole(String),

    /// Socket frame that is not a known `{event, data}` envelope
    #[error("Invalid event frame: {0}")]
    InvalidFrame(String),

    /// Any other field-level rejection
    #[error("Invalid value for '{field}': {message}")]
    Validation { field: String, message: String },
}

impl SharedError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Message for an API error body or a socket `error` event
    pub fn client_message(&self) -> String {
        match self {
            Self::Validation { message, .. } => message.clone(),
            Self::InvalidFrame(_) => "Invalid event".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidFrame(err.to_string())
    }
}
