//! Statistics cache abstraction
//!
//! The router keeps all of its shared state behind [`StatsCache`]: a keyed store
//! of small field maps with atomic per-field operations and a TTL per key.
//!
//! ## Backends
//!
//! - [`InMemoryStatsCache`] - process-local, `DashMap` backed
//! - [`RedisStatsCache`] - shared across processes (feature `redis`)

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;
pub mod types;


pub use memory::InMemoryStatsCache;
#[cfg(feature = "redis")]
pub use self::redis::RedisStatsCache;
pub use types::{CacheEntry, FieldOp, FieldValue, StatsCache};

#[cfg(test)]
pub use types::MockStatsCache;
