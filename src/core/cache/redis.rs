//! Redis statistics cache
//!
//! One Redis hash per key. Counter fields are plain integers updated with
//! `HINCRBY`; sample fields hold a JSON array that is appended and trimmed inside
//! a Lua script, together with the `PEXPIRE` refresh, so a batch of field
//! operations is a single atomic server-side step. TTL expiry is enforced by Redis.

use super::types::{CacheEntry, FieldOp, FieldValue, StatsCache};
use crate::utils::error::{Result, RouterError};
use crate::utils::sanitize_url;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, Script};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

/// KEYS[1] = hash key, ARGV[1] = ttl in ms, then (kind, field, value, cap) per op.
/// For `prune` the field slot carries the prefix and the value slot the bound.
/// Returns the result of the last op.
const APPLY_SCRIPT: &str = r#"
local key = KEYS[1]
local last = 0
local i = 2
while i <= #ARGV do
  local kind = ARGV[i]
  local field = ARGV[i + 1]
  if kind == 'incr' then
    last = redis.call('HINCRBY', key, field, ARGV[i + 2])
  elseif kind == 'prune' then
    local before = ARGV[i + 2]
    local removed = 0
    for _, name in ipairs(redis.call('HKEYS', key)) do
      if string.sub(name, 1, #field) == field then
        local suffix = string.sub(name, #field + 1)
        if not string.find(suffix, ':', 1, true) and suffix < before then
          redis.call('HDEL', key, name)
          removed = removed + 1
        end
      end
    end
    last = removed
  else
    local cap = tonumber(ARGV[i + 3])
    local raw = redis.call('HGET', key, field)
    local samples = {}
    if raw then
      local ok, decoded = pcall(cjson.decode, raw)
      if ok and type(decoded) == 'table' then
        samples = decoded
      end
    end
    table.insert(samples, tonumber(ARGV[i + 2]))
    while #samples > cap do
      table.remove(samples, 1)
    end
    redis.call('HSET', key, field, cjson.encode(samples))
    last = #samples
  end
  i = i + 4
end
redis.call('PEXPIRE', key, ARGV[1])
return last
"#;

/// Shared [`StatsCache`] backed by Redis
#[derive(Clone)]
pub struct RedisStatsCache {
    connection: ConnectionManager,
    apply_script: Script,
    url: String,
}

impl fmt::Debug for RedisStatsCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStatsCache")
            .field("url", &self.url)
            .finish()
    }
}

impl RedisStatsCache {
    /// Connect to Redis
    pub async fn connect(url: &str) -> Result<Self> {
        let sanitized = sanitize_url(url);
        info!("Connecting statistics cache to Redis");
        debug!("Redis URL: {}", sanitized);

        let client = Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;

        info!("Redis statistics cache connected");
        Ok(Self {
            connection,
            apply_script: Script::new(APPLY_SCRIPT),
            url: sanitized,
        })
    }

    /// Health check
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn run_ops(&self, key: &str, ops: &[FieldOp], ttl: Duration) -> Result<i64> {
        let mut invocation = self.apply_script.prepare_invoke();
        invocation.key(key).arg(ttl_millis(ttl));
        for op in ops {
            match op {
                FieldOp::Increment { field, amount } => {
                    invocation.arg("incr").arg(field).arg(*amount).arg(0);
                }
                FieldOp::PushBounded { field, value, cap } => {
                    invocation.arg("push").arg(field).arg(*value).arg(*cap);
                }
                FieldOp::PruneBefore { prefix, before } => {
                    invocation.arg("prune").arg(prefix).arg(before).arg(0);
                }
            }
        }

        let mut conn = self.connection.clone();
        let last: i64 = invocation.invoke_async(&mut conn).await?;
        Ok(last)
    }
}

fn ttl_millis(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX).max(1)
}

/// Decode a raw hash field: integers are counters, JSON arrays are samples
pub(crate) fn decode_field(raw: &str) -> Result<FieldValue> {
    if let Ok(counter) = raw.parse::<i64>() {
        return Ok(FieldValue::Counter(counter));
    }
    let samples: Vec<f64> = serde_json::from_str(raw)?;
    Ok(FieldValue::Samples(samples))
}

pub(crate) fn encode_field(value: &FieldValue) -> Result<String> {
    match value {
        FieldValue::Counter(counter) => Ok(counter.to_string()),
        FieldValue::Samples(samples) => Ok(serde_json::to_string(samples)?),
    }
}

#[async_trait]
impl StatsCache for RedisStatsCache {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        let mut conn = self.connection.clone();
        let raw: HashMap<String, String> = conn.hgetall(key).await?;
        if raw.is_empty() {
            return Ok(None);
        }

        let mut entry = CacheEntry::with_capacity(raw.len());
        for (field, value) in raw {
            match decode_field(&value) {
                Ok(decoded) => {
                    entry.insert(field, decoded);
                }
                Err(e) => debug!(key, field = %field, error = %e, "Skipping undecodable field"),
            }
        }
        Ok(Some(entry))
    }

    async fn set(&self, key: &str, entry: CacheEntry, ttl: Duration) -> Result<()> {
        let items = entry
            .iter()
            .map(|(field, value)| Ok((field.clone(), encode_field(value)?)))
            .collect::<Result<Vec<(String, String)>>>()?;

        let mut pipe = redis::pipe();
        pipe.atomic().del(key).ignore();
        if !items.is_empty() {
            pipe.hset_multiple(key, items.as_slice())
                .ignore()
                .pexpire(key, ttl_millis(ttl))
                .ignore();
        }

        let mut conn = self.connection.clone();
        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }

    async fn increment(&self, key: &str, field: &str, amount: i64, ttl: Duration) -> Result<i64> {
        let op = FieldOp::Increment {
            field: field.to_string(),
            amount,
        };
        self.run_ops(key, std::slice::from_ref(&op), ttl).await
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
        let len = self.run_ops(key, std::slice::from_ref(&op), ttl).await?;
        usize::try_from(len).map_err(|e| RouterError::Cache(format!("Invalid length: {}", e)))
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
        let removed = self.run_ops(key, std::slice::from_ref(&op), ttl).await?;
        usize::try_from(removed).map_err(|e| RouterError::Cache(format!("Invalid count: {}", e)))
    }

    async fn apply(&self, key: &str, ops: &[FieldOp], ttl: Duration) -> Result<()> {
        if ops.is_empty() {
            return Ok(());
        }
        self.run_ops(key, ops, ttl).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
