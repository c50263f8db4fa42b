// Copyright 2025 Cowboy AI, LLC.

//! Configuration for the catalog cache

use crate::collection::LoadingTracking;
use crate::errors::{CatalogError, CatalogResult};
use crate::router::RouterPolicy;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Connection settings for the remote catalog API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// API root, e.g. "http://localhost:5000/api"
    pub base_url: String,

    /// Per-request timeout in seconds (0 = none)
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_secs: 30,
            user_agent: concat!("catalog-cache/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl GatewayConfig {
    /// Configuration pointing at `base_url` with default settings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Parsed API root
    pub fn url(&self) -> CatalogResult<Url> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| CatalogError::Configuration(format!("invalid base url {}: {e}", self.base_url)))?;
        if url.cannot_be_a_base() {
            return Err(CatalogError::Configuration(format!(
                "base url {} cannot carry a path",
                self.base_url
            )));
        }
        Ok(url)
    }

    /// Request timeout, when one is configured
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Collection store settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// How outstanding requests are tracked per collection
    pub loading: LoadingTracking,
}

/// Complete cache configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Remote API settings
    pub gateway: GatewayConfig,
    /// Store settings
    pub store: StoreConfig,
    /// How related entities referenced by name are ensured
    pub router: RouterPolicy,
}

impl CatalogConfig {
    /// Load configuration from a JSON file; absent fields take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Configuration(format!("{}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    /// Parse configuration from JSON text and validate it
    pub fn from_json(raw: &str) -> CatalogResult<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| CatalogError::Configuration(e.to_string()))?;
        config.gateway.url()?;
        Ok(config)
    }
}
