//! Backend Module
//!
//! All server-side code of askVeda: the Axum HTTP server, the WebSocket
//! relay, authentication, storage and the AI proxy.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Application state and startup
//! - **`routes`** - Router assembly and route groups
//! - **`auth`** - Users, login sessions, JWT tokens and auth handlers
//! - **`chat`** - Chat records and chat management handlers
//! - **`messaging`** - Message records and message handlers
//! - **`admin`** - Dashboard listings, statistics and exports
//! - **`ai`** - Proxy to the external AI service with a local fallback
//! - **`realtime`** - WebSocket room relay
//! - **`middleware`** - Bearer-token authentication
//! - **`store`** - Storage traits with Postgres and in-memory backends
//! - **`error`** - Backend error type and its HTTP mapping
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── server/         - State and initialization
//! ├── routes/         - Route configuration
//! ├── auth/           - Authentication
//! ├── chat/           - Chats
//! ├── messaging/      - Messages
//! ├── admin/          - Admin dashboard
//! ├── ai/             - AI proxy
//! ├── realtime/       - WebSocket relay
//! ├── middleware/     - Request middleware
//! ├── store/          - Storage backends
//! └── error/          - Error types
//! ```
//!
//! # State Management
//!
//! `AppState` holds the repository, the room registry, the configuration
//! and the AI client. Storage goes through the `Repository` trait object, so
//! handlers do not know whether Postgres or the in-memory store is active.
//!
//! # Error Handling
//!
//! Handlers return `Result<_, BackendError>`. Storage errors convert with
//! `?`; every error renders as `{"error": message, "status": code}`.
//!
//! # Example
//!
//! ```rust,no_run
//! use askveda::backend::server::create_app;
//! use askveda::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(AppConfig::from_env()?).await?;
//! # Ok(())
//! # }
//! ```

/// Server setup and application state
pub mod server;

/// Route configuration
pub mod routes;

/// Authentication and user management
pub mod auth;

/// Chat management
pub mod chat;

/// Chat messages
pub mod messaging;

/// Admin dashboard
pub mod admin;

/// AI service proxy
pub mod ai;

/// WebSocket room relay
pub mod realtime;

/// Middleware for request processing
pub mod middleware;

/// Storage backends
pub mod store;

/// Backend error types
pub mod error;

pub use error::BackendError;
pub use server::{create_app, AppState};
pub use store::{Repository, StoreError};
