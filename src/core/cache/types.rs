//! Cache contract and value types

use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// A single field of a cache entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Atomically incremented integer
    Counter(i64),
    /// Bounded sequence of samples, oldest first
    Samples(Vec<f64>),
}

impl FieldValue {
    /// Counter value, if this field is a counter
    pub fn as_counter(&self) -> Option<i64> {
        match self {
            FieldValue::Counter(value) => Some(*value),
            FieldValue::Samples(_) => None,
        }
    }

    /// Samples, if this field is a sample sequence
    pub fn as_samples(&self) -> Option<&[f64]> {
        match self {
            FieldValue::Samples(samples) => Some(samples),
            FieldValue::Counter(_) => None,
        }
    }
}

/// Snapshot of all fields stored under one key
pub type CacheEntry = HashMap<String, FieldValue>;

/// One atomic field mutation
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
    /// Add `amount` to a counter, creating it at zero
    Increment { field: String, amount: i64 },
    /// Append `value` to a sample sequence and keep only the newest `cap` entries
    PushBounded { field: String, value: f64, cap: usize },
    /// Remove every field named `{prefix}{suffix}` whose colon-free `suffix`
    /// sorts before `before`
    PruneBefore { prefix: String, before: String },
}

impl FieldOp {
    /// Apply this operation to an entry held under the caller's lock
    ///
    /// Returns the new counter value, the new sequence length, or the number of
    /// pruned fields. Counters saturate at the `i64` bounds.
    pub fn apply_to(&self, fields: &mut CacheEntry) -> i64 {
        match self {
            FieldOp::Increment { field, amount } => {
                let slot = fields
                    .entry(field.clone())
                    .or_insert(FieldValue::Counter(0));
                match slot {
                    FieldValue::Counter(current) => {
                        *current = current.saturating_add(*amount);
                        *current
                    }
                    other => {
                        *other = FieldValue::Counter(*amount);
                        *amount
                    }
                }
            }
            FieldOp::PushBounded { field, value, cap } => {
                let slot = fields
                    .entry(field.clone())
                    .or_insert_with(|| FieldValue::Samples(Vec::new()));
                match slot {
                    FieldValue::Samples(samples) => {
                        samples.push(*value);
                        if samples.len() > *cap {
                            let excess = samples.len() - *cap;
                            samples.drain(..excess);
                        }
                        samples.len() as i64
                    }
                    other => {
                        *other = FieldValue::Samples(vec![*value]);
                        1
                    }
                }
            }
            FieldOp::PruneBefore { prefix, before } => {
                let before_len = fields.len();
                fields.retain(|name, _| {
                    match name.strip_prefix(prefix.as_str()) {
                        Some(suffix) => suffix.contains(':') || suffix >= before.as_str(),
                        None => true,
                    }
                });
                (before_len - fields.len()) as i64
            }
        }
    }
}

/// Keyed, TTL-bounded store with atomic per-field operations
///
/// Contract:
/// - a key that was never written, or whose TTL elapsed, reads as `None`
/// - every mutation refreshes the TTL of the whole key and creates the key
///   (and the field) on first use
/// - concurrent mutations of the same field are never lost
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsCache: Send + Sync {
    /// Read every field stored under `key`
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Replace the entry under `key`
    async fn set(&self, key: &str, entry: CacheEntry, ttl: Duration) -> Result<()>;

    /// Atomically add `amount` to `field`, returning the new value
    async fn increment(&self, key: &str, field: &str, amount: i64, ttl: Duration) -> Result<i64>;

    /// Atomically append `value` to `field`, trimming to `cap`; returns the new length
    async fn push_bounded(
        &self,
        key: &str,
        field: &str,
        value: f64,
        cap: usize,
        ttl: Duration,
    ) -> Result<usize>;

    /// Atomically remove the fields `{prefix}{suffix}` whose suffix sorts
    /// before `before`; returns how many were removed
    async fn prune_before(
        &self,
        key: &str,
        prefix: &str,
        before: &str,
        ttl: Duration,
    ) -> Result<usize>;

    /// Apply several operations to one key
    ///
    /// Backends override this to apply the whole batch atomically; the default
    /// only guarantees per-operation atomicity.
    async fn apply(&self, key: &str, ops: &[FieldOp], ttl: Duration) -> Result<()> {
        for op in ops {
            match op {
                FieldOp::Increment { field, amount } => {
                    self.increment(key, field, *amount, ttl).await?;
                }
                FieldOp::PushBounded { field, value, cap } => {
                    self.push_bounded(key, field, *value, *cap, ttl).await?;
                }
                FieldOp::PruneBefore { prefix, before } => {
                    self.prune_before(key, prefix, before, ttl).await?;
                }
            }
        }
        Ok(())
    }

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}
