//! Authentication Module
//!
//! User accounts, login sessions and JWT tokens, plus the HTTP handlers of
//! `/api/auth`.
//!
//! # Architecture
//!
//! - **`users`** - User record, password hashing, Postgres `UserStore`
//! - **`sessions`** - Login session record and id generation, Postgres `SessionStore`
//! - **`tokens`** - JWT creation and verification
//! - **`handlers`** - HTTP handlers for authentication endpoints
//!
//! # Authentication Flow
//!
//! 1. **Register**: username, mobile and password → user and login session created → token returned
//! 2. **Login**: mobile and password → credentials verified → login session created → token returned
//! 3. **Me**: token → verified → user returned
//! 4. **Logout**: token → login session ended, user marked offline
//!
//! # Security
//!
//! - Passwords are hashed using bcrypt before storage
//! - Tokens are HS256 JWTs with a configurable lifetime (7 days by default)
//! - Invalid credentials return 401 without saying which part was wrong

/// User data model and database operations
pub mod users;

/// Login sessions
pub mod sessions;

/// JWT token generation and validation
pub mod tokens;

/// HTTP handlers for authentication endpoints
pub mod handlers;

// Re-export commonly used types and handlers
pub use handlers::{get_me, login, logout, register, AuthResponse, LoginRequest, RegisterRequest};
pub use tokens::{create_token, verify_token, Claims};
pub use users::User;
