//! Common test utilities and helpers
//!
//! - In-process application harness
//! - Authentication test helpers
//! - Custom assertion macros

pub mod assertions;
#[cfg(feature = "ssr")]
pub mod app;
#[cfg(feature = "ssr")]
pub mod auth_helpers;

#[cfg(feature = "ssr")]
pub use app::*;
#[cfg(feature = "ssr")]
pub use auth_helpers::*;
