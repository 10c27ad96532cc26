//! Integration tests against the in-process router

pub mod api;
pub mod realtime;
