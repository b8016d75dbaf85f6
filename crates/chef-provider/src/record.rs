//! Declared records
//!
//! The desired-state representation handed over by the orchestration host:
//! an optional identity key plus named, kind-tagged field values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single declared field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Plain string value.
    Scalar(String),
    /// JSON document kept as text.
    Json(String),
    /// Ordered sequence of strings.
    List(Vec<String>),
    /// String-to-string map.
    Map(BTreeMap<String, String>),
}

impl FieldValue {
    /// Create a scalar value.
    pub fn scalar(value: impl Into<String>) -> Self {
        FieldValue::Scalar(value.into())
    }

    /// Create a JSON text value.
    pub fn json(text: impl Into<String>) -> Self {
        FieldValue::Json(text.into())
    }

    /// Create a list value.
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::List(items.into_iter().map(Into::into).collect())
    }

    /// Create a map value.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        FieldValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&str> {
        match self {
            FieldValue::Json(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            FieldValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Scalar(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Scalar(s)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        FieldValue::List(items)
    }
}

impl From<BTreeMap<String, String>> for FieldValue {
    fn from(map: BTreeMap<String, String>) -> Self {
        FieldValue::Map(map)
    }
}

/// Desired state of one resource instance.
///
/// `id` is the identity key: `None` while the resource is absent, set to the
/// remote name once it exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,

    #[serde(default)]
    fields: BTreeMap<String, FieldValue>,
}

impl DeclaredRecord {
    /// Create an empty, absent record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty record addressing an existing remote entity.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            fields: BTreeMap::new(),
        }
    }

    /// The identity key, if the resource is present.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Whether the record addresses a remote entity.
    pub fn is_present(&self) -> bool {
        self.id.is_some()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Mark the record absent.
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    /// Set a field value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Set a field using builder pattern.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Get a scalar field.
    pub fn scalar(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_scalar)
    }

    /// Get a JSON text field.
    pub fn json(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_json)
    }

    /// Get a list field.
    pub fn list(&self, name: &str) -> Option<&[String]> {
        self.get(name).and_then(FieldValue::as_list)
    }

    /// Get a map field.
    pub fn map(&self, name: &str) -> Option<&BTreeMap<String, String>> {
        self.get(name).and_then(FieldValue::as_map)
    }

    /// Iterate over all fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    pub(crate) fn fields_mut(&mut self) -> impl Iterator<Item = (&String, &mut FieldValue)> {
        self.fields.iter_mut()
    }

    /// Replace every field with the fields of `other`, keeping the identity key.
    pub fn overwrite_fields(&mut self, other: DeclaredRecord) {
        self.fields = other.fields;
    }
}
