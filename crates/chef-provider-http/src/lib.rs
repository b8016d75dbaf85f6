//! # Chef Provider HTTP
//!
//! Chef server REST gateway for `chef-provider`.
//!
//! [`ChefClient`] implements [`chef_provider::Gateway`] over the Chef server
//! API, signing every request with the configured client key.
//!
//! ## Features
//!
//! - Chef authentication protocol 1.3 (RSA / SHA-256)
//! - Organization-scoped server URLs
//! - Bounded per-request timeout
//! - Optional TLS verification bypass for self-signed servers
//!
//! ## Example
//!
//! ```ignore
//! use chef_provider::prelude::*;
//! use chef_provider_http::{ChefClient, ChefConfig};
//!
//! let config = ChefConfig::from_env()?;
//! let client = ChefClient::new(config)?;
//!
//! let nodes = Controller::new(NodeResource::new());
//! let record = nodes.import(&client, "web1").await?;
//! ```

pub mod client;
pub mod config;
pub mod signing;

// Re-exports
pub use client::ChefClient;
pub use config::ChefConfig;
pub use signing::RequestSigner;
