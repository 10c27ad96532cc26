//! Real-time relay integration tests

mod relay_test;
