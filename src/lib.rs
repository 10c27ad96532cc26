//! askVeda - Chat Backend Library
//!
//! askVeda is a chat service with user accounts, persistent conversations,
//! a WebSocket message relay, and a proxy to an external AI text-generation
//! service whose answers are streamed back to the browser.
//!
//! # Module Structure
//!
//! - **`shared`** - Wire types shared with clients
//!   - User, chat and message views (camelCase JSON)
//!   - Socket event envelopes
//!   - Pagination, configuration and error types
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP server and WebSocket relay
//!   - JWT authentication and login sessions
//!   - Chat, message and admin handlers
//!   - AI upstream proxy with a local fallback simulator
//!   - Postgres and in-memory storage backends
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - Enables the backend modules and the
//!   `askveda-server` binary.
//!
//! # Usage
//!
//! ```rust,no_run
//! use askveda::backend::server::create_app;
//! use askveda::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_env()?;
//! let app = create_app(config).await?;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - `shared::SharedError` for validation of client input
//! - `backend::store::StoreError` for storage failures
//! - `backend::BackendError` for everything that becomes an HTTP response

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
