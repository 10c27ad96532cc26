//! Backend Error Module
//!
//! This module defines the error type returned by every HTTP handler.
//! Errors convert into JSON responses of the form
//! `{"error": "<message>", "status": <code>}`.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions
//! └── conversion.rs - IntoResponse implementation
//! ```
//!
//! # Error Types
//!
//! - `HandlerError` - A status code and a client-facing message
//! - `SharedError` - Validation errors from the shared wire types (400)
//! - `StoreError` - Storage failures (404 / 409 / 500)
//! - `SerializationError` - JSON serialization errors (500)
//!
//! # Example
//!
//! ```rust,no_run
//! use askveda::backend::error::BackendError;
//! use axum::http::StatusCode;
//!
//! fn check(content: &str) -> Result<(), BackendError> {
//!     if content.is_empty() {
//!         return Err(BackendError::handler(StatusCode::BAD_REQUEST, "Content and chatId are required"));
//!     }
//!     Ok(())
//! }
//! ```

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

// Re-export commonly used types
pub use types::BackendError;
