//! Shared Module
//!
//! This module contains types and data structures that describe the wire
//! contract between the server and its clients. They are plain serde types
//! with camelCase JSON names so the existing browser client can consume them
//! unchanged.
//!
//! # Overview
//!
//! - `messaging` - user, chat and message views plus request bodies
//! - `event` - WebSocket event envelopes
//! - `pagination` - page parameters and the pagination block of list responses
//! - `config` - application configuration
//! - `error` - validation and serialization errors

/// Chat, message and user wire types
pub mod messaging;

/// WebSocket event envelopes
pub mod event;

/// Shared error types
pub mod error;

/// Page parameters and pagination metadata
pub mod pagination;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use event::{ClientEvent, IncomingMessage, RelayedMessage, ServerEvent};
pub use error::SharedError;
pub use pagination::{Page, PageQuery, Pagination};
pub use config::{AppConfig, AppConfigBuilder, ConfigError, FallbackPacing};
