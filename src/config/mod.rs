//! Configuration management for the latency router
//!
//! This module handles loading, validation, and environment overrides of the
//! router configuration.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::core::router::Deployment;
use crate::utils::error::{Result, RouterError};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct for the latency router
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Latency routing knobs
    #[serde(default)]
    pub routing: LatencyRoutingConfig,
    /// Statistics backend
    #[serde(default)]
    pub cache: CacheBackendConfig,
    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Deployment roster (only consumed by the command-line driver)
    #[serde(default)]
    pub deployments: Vec<Deployment>,
}

impl Config {
    /// Load configuration from a YAML file, then apply environment overrides
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RouterError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config = Self::from_yaml_str(&content)?;
        config.apply_env_overrides()?;
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse configuration from YAML text without environment overrides
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| RouterError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `LATENCY_ROUTER_*` and `REDIS_URL` variables
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(cap) = env::var("LATENCY_ROUTER_WINDOW_CAP") {
            self.routing.latency_window_cap = cap
                .parse()
                .map_err(|e| RouterError::Config(format!("Invalid window cap: {}", e)))?;
        }
        if let Ok(ttl) = env::var("LATENCY_ROUTER_STATS_TTL") {
            self.routing.stats_ttl_seconds = ttl
                .parse()
                .map_err(|e| RouterError::Config(format!("Invalid stats TTL: {}", e)))?;
        }
        if let Ok(buffer) = env::var("LATENCY_ROUTER_LATENCY_BUFFER") {
            self.routing.lowest_latency_buffer = buffer
                .parse()
                .map_err(|e| RouterError::Config(format!("Invalid latency buffer: {}", e)))?;
        }
        if let Ok(level) = env::var("LATENCY_ROUTER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(url) = env::var("REDIS_URL") {
            self.cache = CacheBackendConfig::Redis { url };
        }
        Ok(())
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.routing
            .validate()
            .map_err(|e| RouterError::Config(format!("Routing config error: {}", e)))?;

        self.cache
            .validate()
            .map_err(|e| RouterError::Config(format!("Cache config error: {}", e)))?;

        self.logging
            .validate()
            .map_err(|e| RouterError::Config(format!("Logging config error: {}", e)))?;

        self.deployments
            .as_slice()
            .validate()
            .map_err(|e| RouterError::Config(format!("Deployment config error: {}", e)))?;

        Ok(())
    }

    /// Deployments registered for `group`, in configuration order
    pub fn deployments_for(&self, group: &str) -> Vec<Deployment> {
        self.deployments
            .iter()
            .filter(|d| d.model_name == group)
            .cloned()
            .collect()
    }
}
