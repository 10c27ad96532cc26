//! API integration tests
//!
//! Integration tests for all API endpoints

mod admin_test;
mod ai_test;
mod auth_test;
mod chat_test;
mod message_test;
mod server_test;
