//! Remote entity types
//!
//! Strongly typed mirrors of the JSON documents the Chef server stores,
//! including the fixed `json_class` / `chef_type` tags it expects.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Free-form attribute namespace.
pub type Attributes = Map<String, Value>;

/// Kind of remote entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Node,
    Role,
    Environment,
    DataBag,
    DataBagItem,
    /// API client registration, deleted alongside nodes.
    Client,
}

impl EntityKind {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Node => "node",
            EntityKind::Role => "role",
            EntityKind::Environment => "environment",
            EntityKind::DataBag => "data_bag",
            EntityKind::DataBagItem => "data_bag_item",
            EntityKind::Client => "client",
        }
    }

    /// Top-level API collection holding entities of this kind.
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Node => "nodes",
            EntityKind::Role => "roles",
            EntityKind::Environment => "environments",
            EntityKind::DataBag | EntityKind::DataBagItem => "data",
            EntityKind::Client => "clients",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address of a single remote entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    kind: EntityKind,
    parent: Option<String>,
    name: String,
}

impl Locator {
    /// Locate a top-level entity.
    pub fn new(kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            parent: None,
            name: name.into(),
        }
    }

    /// Locate an entity nested under a parent (a data bag item in its bag).
    pub fn within(kind: EntityKind, parent: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            parent: Some(parent.into()),
            name: name.into(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the collection new entities are posted to.
    pub fn collection_path(&self) -> String {
        match &self.parent {
            Some(parent) => format!("/{}/{}", self.kind.collection(), parent),
            None => format!("/{}", self.kind.collection()),
        }
    }

    /// Path of the entity itself.
    pub fn path(&self) -> String {
        format!("{}/{}", self.collection_path(), self.name)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parent {
            Some(parent) => write!(f, "{} {}/{}", self.kind, parent, self.name),
            None => write!(f, "{} {}", self.kind, self.name),
        }
    }
}

/// A document the Chef server stores and returns.
pub trait RemoteEntity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Kind of this entity.
    const KIND: EntityKind;

    /// Name the server files this entity under.
    fn identity(&self) -> &str;

    /// Build the entity from a response body fetched at `locator`.
    fn from_response(_locator: &Locator, body: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(body)
    }
}

fn default_environment() -> String {
    "_default".to_string()
}

fn node_json_class() -> String {
    "Chef::Node".to_string()
}

fn node_chef_type() -> String {
    "node".to_string()
}

/// A Chef node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,

    #[serde(rename = "chef_environment", default = "default_environment")]
    pub environment: String,

    #[serde(rename = "automatic", default)]
    pub automatic_attributes: Attributes,

    #[serde(rename = "normal", default)]
    pub normal_attributes: Attributes,

    #[serde(rename = "default", default)]
    pub default_attributes: Attributes,

    #[serde(rename = "override", default)]
    pub override_attributes: Attributes,

    #[serde(default)]
    pub run_list: Vec<String>,

    #[serde(default = "node_json_class")]
    pub json_class: String,

    #[serde(default = "node_chef_type")]
    pub chef_type: String,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            environment: default_environment(),
            automatic_attributes: Attributes::new(),
            normal_attributes: Attributes::new(),
            default_attributes: Attributes::new(),
            override_attributes: Attributes::new(),
            run_list: Vec::new(),
            json_class: node_json_class(),
            chef_type: node_chef_type(),
        }
    }
}

impl RemoteEntity for Node {
    const KIND: EntityKind = EntityKind::Node;

    fn identity(&self) -> &str {
        &self.name
    }
}

fn role_json_class() -> String {
    "Chef::Role".to_string()
}

fn role_chef_type() -> String {
    "role".to_string()
}

/// A Chef role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub default_attributes: Attributes,

    #[serde(default)]
    pub override_attributes: Attributes,

    #[serde(default)]
    pub run_list: Vec<String>,

    /// Per-environment run lists; not managed, carried through untouched.
    #[serde(default)]
    pub env_run_lists: BTreeMap<String, Vec<String>>,

    #[serde(default = "role_json_class")]
    pub json_class: String,

    #[serde(default = "role_chef_type")]
    pub chef_type: String,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            default_attributes: Attributes::new(),
            override_attributes: Attributes::new(),
            run_list: Vec::new(),
            env_run_lists: BTreeMap::new(),
            json_class: role_json_class(),
            chef_type: role_chef_type(),
        }
    }
}

impl RemoteEntity for Role {
    const KIND: EntityKind = EntityKind::Role;

    fn identity(&self) -> &str {
        &self.name
    }
}

fn environment_json_class() -> String {
    "Chef::Environment".to_string()
}

fn environment_chef_type() -> String {
    "environment".to_string()
}

/// A Chef environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub default_attributes: Attributes,

    #[serde(default)]
    pub override_attributes: Attributes,

    /// Cookbook name to version constraint.
    #[serde(default)]
    pub cookbook_versions: BTreeMap<String, String>,

    #[serde(default = "environment_json_class")]
    pub json_class: String,

    #[serde(default = "environment_chef_type")]
    pub chef_type: String,
}

impl Environment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            default_attributes: Attributes::new(),
            override_attributes: Attributes::new(),
            cookbook_versions: BTreeMap::new(),
            json_class: environment_json_class(),
            chef_type: environment_chef_type(),
        }
    }
}

impl RemoteEntity for Environment {
    const KIND: EntityKind = EntityKind::Environment;

    fn identity(&self) -> &str {
        &self.name
    }
}

/// A data bag (a named container of items).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataBag {
    pub name: String,
}

impl RemoteEntity for DataBag {
    const KIND: EntityKind = EntityKind::DataBag;

    fn identity(&self) -> &str {
        &self.name
    }

    /// `GET /data/<bag>` lists the bag's items, so the name comes from the
    /// locator rather than the body.
    fn from_response(locator: &Locator, _body: Value) -> Result<Self, serde_json::Error> {
        Ok(Self {
            name: locator.name().to_string(),
        })
    }
}

/// An item stored in a data bag.
///
/// The body is free-form JSON; its `id` key names the item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataBagItem {
    /// Owning bag. Not part of the stored body.
    #[serde(skip)]
    pub data_bag: String,

    pub id: String,

    #[serde(flatten)]
    pub content: Attributes,
}

impl RemoteEntity for DataBagItem {
    const KIND: EntityKind = EntityKind::DataBagItem;

    fn identity(&self) -> &str {
        &self.id
    }

    /// Some server versions wrap an updated item with `chef_type` /
    /// `data_bag` keys or nest it under `raw_data`; both are unwrapped.
    fn from_response(locator: &Locator, body: Value) -> Result<Self, serde_json::Error> {
        let mut body = match body {
            Value::Object(mut map) => match map.remove("raw_data") {
                Some(Value::Object(raw)) => raw,
                Some(other) => {
                    map.insert("raw_data".to_string(), other);
                    map
                }
                None => map,
            },
            other => return serde_json::from_value(other),
        };

        if body.get("chef_type").and_then(Value::as_str) == Some("data_bag_item") {
            body.remove("chef_type");
            body.remove("data_bag");
        }

        let mut item: DataBagItem = serde_json::from_value(Value::Object(body))?;
        item.data_bag = locator.parent().unwrap_or_default().to_string();
        Ok(item)
    }
}
