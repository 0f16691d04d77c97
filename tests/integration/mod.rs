//! Integration tests for latency-router
//!
//! These tests drive the public API with the in-memory backend and a manual
//! clock, without mocking.

pub mod config_tests;
pub mod latency_routing_tests;
