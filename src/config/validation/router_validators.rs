//! Router configuration validators

use super::trait_def::Validate;
use crate::config::models::*;
use crate::core::router::Deployment;
use std::collections::HashSet;
use tracing::debug;

impl Validate for LatencyRoutingConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating latency routing configuration");

        if self.latency_window_cap == 0 {
            return Err("Latency window cap must be greater than 0".to_string());
        }

        if self.stats_ttl_seconds == 0 {
            return Err("Stats TTL must be greater than 0 seconds".to_string());
        }

        if !self.lowest_latency_buffer.is_finite() || self.lowest_latency_buffer < 0.0 {
            return Err("Lowest latency buffer must be a finite, non-negative number".to_string());
        }

        Ok(())
    }
}

impl Validate for CacheBackendConfig {
    fn validate(&self) -> Result<(), String> {
        match self {
            CacheBackendConfig::InMemory => Ok(()),
            CacheBackendConfig::Redis { url } => {
                if url.trim().is_empty() {
                    return Err("Redis URL cannot be empty".to_string());
                }
                if !url.starts_with("redis://") && !url.starts_with("rediss://") {
                    return Err("Redis URL must use the redis:// or rediss:// scheme".to_string());
                }
                Ok(())
            }
        }
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.level.trim().is_empty() {
            return Err("Log level cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Validate for Deployment {
    fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Deployment id cannot be empty".to_string());
        }
        if self.model_name.trim().is_empty() {
            return Err(format!("Deployment {} has an empty model_name", self.id));
        }
        if self.rpm == Some(0) {
            debug!(deployment = %self.id, "rpm limit of 0 never admits a request");
        }
        Ok(())
    }
}

impl Validate for [Deployment] {
    fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for deployment in self {
            deployment.validate()?;
            if !seen.insert(deployment.id.as_str()) {
                return Err(format!("Duplicate deployment id: {}", deployment.id));
            }
        }
        Ok(())
    }
}
