/**
 * Backend Error Types
 *
 * `BackendError` is what handlers return. Every variant maps to an HTTP
 * status code and a message that is safe to show to clients; internal
 * details (SQL errors, upstream failures) are logged, not returned.
 *
 * # Status Code Mapping
 *
 * - `HandlerError` - the status carried by the error
 * - `SharedError` - 400
 * - `StoreError` - 404 not found, 409 conflict, 500 otherwise
 * - `SerializationError` - 500
 */
use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::store::StoreError;
use crate::shared::SharedError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use askveda::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::handler(StatusCode::NOT_FOUND, "Chat not found");
/// assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error with an explicit status (missing fields, access denied, ...)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Error from the shared wire types
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Storage error without a route-specific message
    #[error(transparent)]
    StoreError(#[from] StoreError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::NOT_FOUND, message)
    }

    /// Log `err` and produce a 500 carrying only `message`
    pub fn internal(message: &str, err: impl std::fmt::Display) -> Self {
        tracing::error!("{}: {}", message, err);
        Self::handler(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::SharedError(_) => StatusCode::BAD_REQUEST,
            Self::StoreError(err) => match err {
                StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                StoreError::Conflict(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the client-facing error message
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::SharedError(err) => err.client_message(),
            Self::StoreError(err) => match err {
                StoreError::NotFound { .. } | StoreError::Conflict(_) => err.to_string(),
                _ => "Internal server error".to_string(),
            },
            Self::SerializationError(_) => "Internal server error".to_string(),
        }
    }
}
