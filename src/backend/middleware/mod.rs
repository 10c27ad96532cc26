//! Middleware Module
//!
//! HTTP middleware applied to groups of routes.
//!
//! - **`auth`** - Bearer-token authentication for the chats, messages,
//!   admin and AI routers
//! - **`json`** - `JsonBody`, a JSON body extractor that rejects with
//!   `BackendError`
//!
//! # Example
//!
//! ```rust,no_run
//! use askveda::backend::middleware::auth_middleware;
//! use askveda::backend::server::AppState;
//! use axum::{middleware, Router};
//!
//! fn protect(router: Router<AppState>, state: AppState) -> Router<AppState> {
//!     router.route_layer(middleware::from_fn_with_state(state, auth_middleware))
//! }
//! ```

pub mod auth;
pub mod json;

pub use auth::{
    auth_middleware, authenticate, token_middleware, AuthUser, AuthenticatedUser,
};
pub use json::JsonBody;
