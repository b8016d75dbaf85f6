//! Chef server connection configuration
//!
//! Settings come from a serde document, from the environment, or from the
//! builder methods below.
//!
//! # Credentials
//!
//! The client key is accepted as `key_material`, or through the deprecated
//! `private_key_pem` field. When both are set `key_material` wins.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use chef_provider::error::{ProviderError, ProviderResult};

use crate::signing::parse_private_key;

/// Environment variable holding the server URL.
pub const ENV_SERVER_URL: &str = "CHEF_SERVER_URL";
/// Environment variable holding the API client name.
pub const ENV_CLIENT_NAME: &str = "CHEF_CLIENT_NAME";
/// Environment variable holding the client key as PEM text.
pub const ENV_KEY_MATERIAL: &str = "CHEF_KEY_MATERIAL";
/// Environment variable naming a file that holds the client key.
pub const ENV_PRIVATE_KEY_FILE: &str = "CHEF_PRIVATE_KEY_FILE";

const REDACTED: &str = "***REDACTED***";

/// Configuration for [`ChefClient`](crate::ChefClient).
#[derive(Clone, Serialize, Deserialize)]
pub struct ChefConfig {
    /// Server URL, including `/organizations/<org>` when the server hosts
    /// several organizations.
    pub server_url: String,

    /// API client the requests are signed as.
    pub client_name: String,

    /// Client key. Deprecated in favor of `key_material`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_pem: Option<String>,

    /// Client key as PEM text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_material: Option<String>,

    /// Skip TLS certificate verification.
    #[serde(default)]
    pub allow_unverified_ssl: bool,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl std::fmt::Debug for ChefConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let config = self.redacted();
        f.debug_struct("ChefConfig")
            .field("server_url", &config.server_url)
            .field("client_name", &config.client_name)
            .field("private_key_pem", &config.private_key_pem)
            .field("key_material", &config.key_material)
            .field("allow_unverified_ssl", &config.allow_unverified_ssl)
            .field("request_timeout_secs", &config.request_timeout_secs)
            .finish()
    }
}

impl ChefConfig {
    /// Create a config with required fields.
    pub fn new(server_url: impl Into<String>, client_name: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            client_name: client_name.into(),
            private_key_pem: None,
            key_material: None,
            allow_unverified_ssl: false,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    /// Build a config from `CHEF_*` environment variables.
    ///
    /// Reads:
    /// - `CHEF_SERVER_URL`
    /// - `CHEF_CLIENT_NAME`
    /// - `CHEF_KEY_MATERIAL`
    /// - `CHEF_PRIVATE_KEY_FILE`, read into `private_key_pem`
    pub fn from_env() -> ProviderResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ProviderResult<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let mut config = Self::new(
            var(ENV_SERVER_URL).unwrap_or_default(),
            var(ENV_CLIENT_NAME).unwrap_or_default(),
        );
        config.key_material = var(ENV_KEY_MATERIAL);
        if let Some(path) = var(ENV_PRIVATE_KEY_FILE) {
            config = config.with_key_file(path)?;
        }

        Ok(config)
    }

    /// Set the client key.
    pub fn with_key_material(mut self, pem: impl Into<String>) -> Self {
        self.key_material = Some(pem.into());
        self
    }

    /// Read the client key from a file into `private_key_pem`.
    pub fn with_key_file(mut self, path: impl AsRef<Path>) -> ProviderResult<Self> {
        let path = path.as_ref();
        let pem = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::invalid_configuration(format!(
                "failed to read key file {}: {e}",
                path.display()
            ))
        })?;
        self.private_key_pem = Some(pem);
        Ok(self)
    }

    /// Skip TLS certificate verification.
    pub fn with_unverified_ssl(mut self) -> Self {
        self.allow_unverified_ssl = true;
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// The effective client key.
    pub fn resolved_key(&self) -> Option<&str> {
        let key_material = self.key_material.as_deref().filter(|k| !k.is_empty());
        let legacy = self.private_key_pem.as_deref().filter(|k| !k.is_empty());

        match (key_material, legacy) {
            (Some(key), _) => Some(key),
            (None, Some(key)) => {
                warn!("private_key_pem is deprecated, use key_material");
                Some(key)
            }
            (None, None) => None,
        }
    }

    /// Build the full URL for a server path.
    pub fn url(&self, path: &str) -> String {
        let base = self.server_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> ProviderResult<()> {
        if self.server_url.is_empty() {
            return Err(ProviderError::invalid_configuration("server_url is required"));
        }

        let url = url::Url::parse(&self.server_url).map_err(|e| {
            ProviderError::invalid_configuration(format!("invalid server_url: {e}"))
        })?;
        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(ProviderError::invalid_configuration(format!(
                "unsupported scheme: {}",
                url.scheme()
            )));
        }

        if self.client_name.is_empty() {
            return Err(ProviderError::invalid_configuration("client_name is required"));
        }

        if self.request_timeout_secs == 0 {
            return Err(ProviderError::invalid_configuration(
                "request_timeout_secs must be positive",
            ));
        }

        let key = self.resolved_key().ok_or_else(|| {
            ProviderError::invalid_configuration("key_material or private_key_pem is required")
        })?;
        parse_private_key(key)?;

        Ok(())
    }

    /// Copy with key material masked, for logging.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.private_key_pem = config.private_key_pem.map(|_| REDACTED.to_string());
        config.key_material = config.key_material.map(|_| REDACTED.to_string());
        config
    }
}
