//! Authentication Handlers Module
//!
//! HTTP handlers for the `/api/auth` endpoints.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs       - Module exports and documentation
//! ├── types.rs     - Request/response types and the client-info extractor
//! ├── session.rs   - Login session + token issuing shared by register/login
//! ├── register.rs  - User registration handler
//! ├── login.rs     - User authentication handler
//! └── me.rs        - Current user and logout handlers
//! ```
//!
//! # Handlers
//!
//! - **`register`** - POST /api/auth/register
//! - **`login`** - POST /api/auth/login
//! - **`get_me`** - GET /api/auth/me
//! - **`logout`** - POST /api/auth/logout

/// Request and response types
pub mod types;

/// Login session issuing
pub mod session;

/// Register handler
pub mod register;

/// Login handler
pub mod login;

/// Current user and logout handlers
pub mod me;

pub use types::{AuthResponse, ClientInfo, LoginRequest, RegisterRequest, UserResponse};

pub use login::login;
pub use me::{get_me, logout};
pub use register::register;
