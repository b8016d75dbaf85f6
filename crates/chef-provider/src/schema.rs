//! Declared-field schemas
//!
//! Every resource kind declares its fields up front with an explicit kind.
//! Records are checked against the schema at the boundary, so mappers can
//! rely on field kinds instead of probing values at runtime.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::canonical::{normalize_json, normalize_run_list};
use crate::error::{ProviderError, ProviderResult};
use crate::record::{DeclaredRecord, FieldValue};

/// Kind of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Plain string.
    Scalar,
    /// JSON document stored in canonical text form.
    CanonicalJson,
    /// Ordered run list, entries stored in qualified form.
    RunList,
    /// String-to-string map.
    StringMap,
}

impl FieldKind {
    /// Check whether a value is of this kind.
    pub fn accepts(&self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (FieldKind::Scalar, FieldValue::Scalar(_))
                | (FieldKind::CanonicalJson, FieldValue::Json(_))
                | (FieldKind::RunList, FieldValue::List(_))
                | (FieldKind::StringMap, FieldValue::Map(_))
        )
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldKind::Scalar => "a string",
            FieldKind::CanonicalJson => "JSON text",
            FieldKind::RunList => "a run list",
            FieldKind::StringMap => "a string map",
        };
        f.write_str(s)
    }
}

/// Declaration of a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    /// Changing the value requires replacing the resource.
    pub force_new: bool,
    pub default: Option<FieldValue>,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            force_new: false,
            default: None,
        }
    }

    pub fn scalar(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Scalar)
    }

    /// JSON text field defaulting to an empty object.
    pub fn json_object(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::CanonicalJson).with_default(FieldValue::json("{}"))
    }

    /// Run-list field defaulting to an empty list.
    pub fn run_list(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::RunList).with_default(FieldValue::List(Vec::new()))
    }

    /// String-map field defaulting to an empty map.
    pub fn string_map(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::StringMap).with_default(FieldValue::Map(Default::default()))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn with_default(mut self, value: FieldValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Canonical form of a value of this field.
    fn canonicalize(&self, value: &mut FieldValue) {
        match (self.kind, value) {
            (FieldKind::CanonicalJson, FieldValue::Json(text)) => {
                *text = normalize_json(text);
            }
            (FieldKind::RunList, FieldValue::List(entries)) => {
                *entries = normalize_run_list(entries.as_slice());
            }
            _ => {}
        }
    }
}

/// Field declarations for one resource kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSchema {
    /// Resource type name as exposed to the host (e.g. `chef_node`).
    pub type_name: String,
    pub fields: Vec<FieldSchema>,
}

impl ResourceSchema {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field using builder pattern.
    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Find a field declaration by name.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of fields whose change forces replacement.
    pub fn force_new_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter().filter(|f| f.force_new)
    }

    /// Check a record against the declarations.
    ///
    /// Every field must be declared and hold a value of the declared kind,
    /// and every required field must be present.
    pub fn validate(&self, record: &DeclaredRecord) -> ProviderResult<()> {
        for (name, value) in record.fields() {
            let field = self
                .field(name)
                .ok_or_else(|| ProviderError::UnknownField {
                    field: name.clone(),
                    resource: self.type_name.clone(),
                })?;

            if !field.kind.accepts(value) {
                return Err(ProviderError::FieldType {
                    field: name.clone(),
                    expected: field.kind,
                });
            }
        }

        if let Some(missing) = self
            .fields
            .iter()
            .find(|f| f.required && !record.has(&f.name))
        {
            return Err(ProviderError::MissingField {
                field: missing.name.clone(),
            });
        }

        Ok(())
    }

    /// Fill absent fields with their declared defaults.
    pub fn apply_defaults(&self, record: &mut DeclaredRecord) {
        for field in &self.fields {
            if let Some(default) = &field.default {
                if !record.has(&field.name) {
                    record.set(field.name.clone(), default.clone());
                }
            }
        }
    }

    /// Validate a record and return a copy with defaults applied.
    pub fn prepare(&self, record: &DeclaredRecord) -> ProviderResult<DeclaredRecord> {
        let mut prepared = record.clone();
        self.apply_defaults(&mut prepared);
        self.validate(&prepared)?;
        Ok(prepared)
    }

    /// Rewrite every JSON and run-list field into canonical form.
    pub fn canonicalize(&self, record: &mut DeclaredRecord) {
        for (name, value) in record.fields_mut() {
            if let Some(field) = self.field(name) {
                field.canonicalize(value);
            }
        }
    }

    /// Force-new fields whose canonical values differ between two records.
    pub fn replacement_fields(&self, prior: &DeclaredRecord, next: &DeclaredRecord) -> Vec<String> {
        let mut prior = prior.clone();
        let mut next = next.clone();
        self.canonicalize(&mut prior);
        self.canonicalize(&mut next);

        self.force_new_fields()
            .filter(|f| prior.get(&f.name) != next.get(&f.name))
            .map(|f| f.name.clone())
            .collect()
    }
}
