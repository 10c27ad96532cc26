//! Route Configuration Module
//!
//! Assembles every HTTP and WebSocket route of the server.
//!
//! - **`router`** - top-level routes, shared layers and the 404 fallback
//! - **`api_routes`** - the `/api/*` groups and their middleware
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs         - Module exports and documentation
//! ├── router.rs      - Main router creation
//! └── api_routes.rs  - API route groups
//! ```
//!
//! # Authentication
//!
//! `/api/chats`, `/api/messages` and `/api/admin` sit behind
//! `auth_middleware`, which loads the user. `/api/ai` sits behind
//! `token_middleware`, which only verifies the token. `/api/auth` is public.
//!
//! # Example
//!
//! ```rust,no_run
//! use askveda::backend::routes::create_router;
//! use askveda::backend::server::build_state;
//! use askveda::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let state = build_state(AppConfig::from_env()?).await?;
//! let router = create_router(state);
//! # Ok(())
//! # }
//! ```

/// Main router creation
pub mod router;

/// API route groups
pub mod api_routes;

pub use router::create_router;
