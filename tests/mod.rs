//! Test suite for askVeda
//!
//! Integration tests drive the full router in-process against the
//! in-memory repository.

pub mod common;
#[cfg(feature = "ssr")]
pub mod integration;
