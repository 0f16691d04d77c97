//! Deployment descriptors
//!
//! A `Deployment` is one concrete backend that can serve a model group
//! (e.g. "azure-gpt4-eu" serving "gpt-4"), together with its admission limits
//! and the parameters the caller needs to actually route a request to it.
//!
//! The router never keeps a roster of its own: descriptors are handed in by the
//! caller on every selection, and the winning one is handed back by value.

use serde::{Deserialize, Serialize};

/// Deployment identifier (unique within a model group)
pub type DeploymentId = String;

/// Deployment descriptor
///
/// ## Example
///
/// ```rust
/// use latency_router::core::router::Deployment;
///
/// let deployment = Deployment::new("azure-eu", "gpt-4")
///     .with_model("azure/gpt-4-turbo")
///     .with_api_base("https://eu.example.openai.azure.com")
///     .with_rpm(500)
///     .with_tpm(100_000);
///
/// assert_eq!(deployment.rpm, Some(500));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    /// Unique deployment ID
    pub id: DeploymentId,

    /// Model group this deployment serves (e.g., "gpt-4")
    pub model_name: String,

    /// Provider-specific model (e.g., "azure/gpt-4-turbo")
    #[serde(default)]
    pub model: String,

    /// Endpoint override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    /// Requests per minute limit (None = unlimited)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpm: Option<u64>,

    /// Tokens per minute limit (None = unlimited)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tpm: Option<u64>,
}

impl Deployment {
    /// Create a deployment with no limits
    pub fn new(id: impl Into<DeploymentId>, model_name: impl Into<String>) -> Self {
        let model_name = model_name.into();
        Self {
            id: id.into(),
            model: model_name.clone(),
            model_name,
            api_base: None,
            rpm: None,
            tpm: None,
        }
    }

    /// Set the provider-specific model (builder pattern)
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the endpoint override (builder pattern)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Set the requests-per-minute limit (builder pattern)
    pub fn with_rpm(mut self, rpm: u64) -> Self {
        self.rpm = Some(rpm);
        self
    }

    /// Set the tokens-per-minute limit (builder pattern)
    pub fn with_tpm(mut self, tpm: u64) -> Self {
        self.tpm = Some(tpm);
        self
    }

    /// Whether neither limit is configured
    pub fn is_unconstrained(&self) -> bool {
        self.rpm.is_none() && self.tpm.is_none()
    }
}
