//! Server Module
//!
//! Server-side initialization: the shared application state and the
//! function that turns an `AppConfig` into a ready-to-serve router.
//!
//! # Architecture
//!
//! - **`state`** - Application state structure and `FromRef` implementations
//! - **`init`** - State construction, router creation and background tasks
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! └── init.rs         - Server initialization and app creation
//! ```
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

/// Application state management
pub mod state;

/// Server initialization
pub mod init;

// Re-export commonly used types
pub use init::{build_state, create_app};
pub use state::AppState;
