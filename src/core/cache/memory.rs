//! In-memory statistics cache
//!
//! Entries live in a `DashMap`; the shard guard held by `entry()` is the unit of
//! atomicity, so contention is scoped to a single key and there is no global lock.
//! Expiry is passive: an entry past its deadline is treated as absent on the next
//! access and dropped there, or in bulk by [`InMemoryStatsCache::purge_expired`].

use super::types::{CacheEntry, FieldOp, StatsCache};
use crate::utils::error::Result;
use crate::utils::time::{Clock, SystemClock, to_chrono};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
struct StoredEntry {
    fields: CacheEntry,
    expires_at: DateTime<Utc>,
}

impl StoredEntry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Process-local [`StatsCache`]
#[derive(Debug)]
pub struct InMemoryStatsCache {
    entries: DashMap<String, StoredEntry>,
    clock: Arc<dyn Clock>,
}

impl InMemoryStatsCache {
    /// Create a cache driven by the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a cache that evaluates TTLs against `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Number of stored keys, including ones expired but not yet purged
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every expired key, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(removed, "Purged expired statistics entries");
        }
        removed
    }

    /// Run `f` against the live fields of `key` under its shard lock, refreshing the TTL
    fn write<R>(&self, key: &str, ttl: Duration, f: impl FnOnce(&mut CacheEntry) -> R) -> R {
        let now = self.clock.now();
        let expires_at = now
            .checked_add_signed(to_chrono(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut slot = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| StoredEntry {
                fields: CacheEntry::new(),
                expires_at: now,
            });

        if !slot.is_live(now) {
            slot.fields.clear();
        }
        slot.expires_at = expires_at;
        f(&mut slot.fields)
    }
}

impl Default for InMemoryStatsCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatsCache for InMemoryStatsCache {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        let now = self.clock.now();

        match self.entries.get(key) {
            None => return Ok(None),
            Some(entry) if entry.is_live(now) => return Ok(Some(entry.fields.clone())),
            Some(_) => {}
        }

        // The read guard must be released before removing from the same shard
        self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        debug!(key, "Statistics entry expired");
        Ok(None)
    }

    async fn set(&self, key: &str, entry: CacheEntry, ttl: Duration) -> Result<()> {
        self.write(key, ttl, |fields| *fields = entry);
        Ok(())
    }

    async fn increment(&self, key: &str, field: &str, amount: i64, ttl: Duration) -> Result<i64> {
        let op = FieldOp::Increment {
            field: field.to_string(),
            amount,
        };
        Ok(self.write(key, ttl, |fields| op.apply_to(fields)))
    }

    async fn push_bounded(
        &self,
        key: &str,
        field: &str,
        value: f64,
        cap: usize,
        ttl: Duration,
    ) -> Result<usize> {
        let op = FieldOp::PushBounded {
            field: field.to_string(),
            value,
            cap,
        };
        let len = self.write(key, ttl, |fields| op.apply_to(fields));
        Ok(len as usize)
    }

    async fn prune_before(
        &self,
        key: &str,
        prefix: &str,
        before: &str,
        ttl: Duration,
    ) -> Result<usize> {
        let op = FieldOp::PruneBefore {
            prefix: prefix.to_string(),
            before: before.to_string(),
        };
        let removed = self.write(key, ttl, |fields| op.apply_to(fields));
        Ok(removed as usize)
    }

    async fn apply(&self, key: &str, ops: &[FieldOp], ttl: Duration) -> Result<()> {
        self.write(key, ttl, |fields| {
            for op in ops {
                op.apply_to(fields);
            }
        });
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "in_memory"
    }
}
