//! Core functionality of the latency router
//!
//! - `cache` - Statistics cache contract and backends
//! - `router` - Latency-based deployment selection

pub mod cache;
pub mod router;
