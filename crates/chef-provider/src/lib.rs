//! # Chef Provider
//!
//! Reconciliation engine for declaratively managed Chef server resources.
//!
//! An orchestration host declares the desired state of nodes, roles,
//! environments, data bags and data bag items as [`DeclaredRecord`]s. The
//! [`Controller`] turns those records into remote entities, drives create /
//! read / update / delete / import through a [`Gateway`], and maps the
//! server's answers back into canonical records so refreshing state never
//! reports formatting-only drift.
//!
//! ## Architecture
//!
//! - [`canonical`] - Canonical forms for JSON text and run-list entries
//! - [`record`] - Declared records and kind-tagged field values
//! - [`schema`] - Per-resource field declarations and validation
//! - [`entity`] - Typed remote entities and locators
//! - [`resource`] - Entity mappers, one per resource kind
//! - [`gateway`] - Remote CRUD capability trait
//! - [`controller`] - Lifecycle operations
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```ignore
//! use chef_provider::prelude::*;
//!
//! let nodes = Controller::new(NodeResource::new());
//! let mut record = DeclaredRecord::new()
//!     .with("name", "web1")
//!     .with("run_list", FieldValue::list(["base"]));
//!
//! nodes.create(&gateway, &mut record).await?;
//! assert_eq!(record.id(), Some("web1"));
//! ```

pub mod canonical;
pub mod controller;
pub mod entity;
pub mod error;
pub mod gateway;
pub mod record;
pub mod resource;
pub mod schema;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::canonical::{normalize_json, normalize_run_list, normalize_run_list_entry};
    pub use crate::controller::Controller;
    pub use crate::entity::{
        DataBag, DataBagItem, EntityKind, Environment, Locator, Node, RemoteEntity, Role,
    };
    pub use crate::error::{ProviderError, ProviderResult};
    pub use crate::gateway::Gateway;
    pub use crate::record::{DeclaredRecord, FieldValue};
    pub use crate::resource::{
        DataBagItemResource, DataBagResource, EnvironmentResource, NodeResource, Resource,
        RoleResource,
    };
    pub use crate::schema::{FieldKind, FieldSchema, ResourceSchema};
}

pub use controller::Controller;
pub use error::{ProviderError, ProviderResult};
pub use gateway::Gateway;
pub use record::{DeclaredRecord, FieldValue};

// Re-export async_trait for gateway implementors
pub use async_trait::async_trait;
