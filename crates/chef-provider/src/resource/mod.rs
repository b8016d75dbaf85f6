//! Entity mappers
//!
//! One [`Resource`] per Chef entity kind. Each declares its field schema and
//! converts between a [`DeclaredRecord`] and the typed remote entity.

mod data_bag;
mod data_bag_item;
mod environment;
mod node;
mod role;

pub use data_bag::DataBagResource;
pub use data_bag_item::DataBagItemResource;
pub use environment::EnvironmentResource;
pub use node::NodeResource;
pub use role::RoleResource;

use crate::entity::{Attributes, Locator, RemoteEntity};
use crate::error::{ProviderError, ProviderResult};
use crate::record::{DeclaredRecord, FieldValue};
use crate::schema::ResourceSchema;

/// Default description given to roles and environments.
pub const DEFAULT_DESCRIPTION: &str = "Managed by chef-provider";

/// A resource kind the controller can reconcile.
pub trait Resource: Send + Sync {
    /// Remote entity this resource maps to.
    type Entity: RemoteEntity;

    /// Declared field schema.
    fn schema(&self) -> &ResourceSchema;

    /// Resource type name as exposed to the host.
    fn type_name(&self) -> &str {
        &self.schema().type_name
    }

    /// Address the remote entity identified by `id`.
    ///
    /// `record` supplies any parent reference the identity key alone
    /// does not carry.
    fn locate(&self, id: &str, record: &DeclaredRecord) -> ProviderResult<Locator>;

    /// Build the remote entity from a prepared record.
    fn to_remote(&self, record: &DeclaredRecord) -> ProviderResult<Self::Entity>;

    /// Build declared fields from a remote entity.
    fn from_remote(&self, entity: &Self::Entity) -> ProviderResult<DeclaredRecord>;

    /// Whether deleting also purges a same-named API client.
    fn purges_auxiliary(&self) -> bool {
        false
    }

    /// Declared field the identity key is taken from, for error reports.
    fn identity_field(&self) -> &str {
        "name"
    }

    /// Fields whose change between `prior` and `next` forces replacement.
    fn replacement_fields(&self, prior: &DeclaredRecord, next: &DeclaredRecord) -> Vec<String> {
        self.schema().replacement_fields(prior, next)
    }
}

/// Read a required scalar field.
pub(crate) fn required_scalar<'a>(record: &'a DeclaredRecord, field: &str) -> ProviderResult<&'a str> {
    record
        .scalar(field)
        .ok_or_else(|| ProviderError::MissingField {
            field: field.to_string(),
        })
}

/// Decode a JSON text field into an attribute namespace.
///
/// An absent field decodes to an empty object.
pub(crate) fn decode_attributes(record: &DeclaredRecord, field: &str) -> ProviderResult<Attributes> {
    match record.json(field) {
        Some(text) => serde_json::from_str(text).map_err(|source| ProviderError::FieldDecode {
            field: field.to_string(),
            source,
        }),
        None => Ok(Attributes::new()),
    }
}

/// Encode an attribute namespace as a JSON text field value.
pub(crate) fn encode_attributes(field: &str, attributes: &Attributes) -> ProviderResult<FieldValue> {
    serde_json::to_string(attributes)
        .map(FieldValue::Json)
        .map_err(|e| ProviderError::serialization(format!("failed to encode {field}"), e))
}

/// Copy a run-list field, preserving order.
pub(crate) fn run_list(record: &DeclaredRecord, field: &str) -> Vec<String> {
    record.list(field).map(<[String]>::to_vec).unwrap_or_default()
}

/// Reject names that cannot be used as a single path segment.
pub(crate) fn check_name(field: &str, name: &str) -> ProviderResult<()> {
    if name.is_empty() {
        return Err(ProviderError::InvalidField {
            field: field.to_string(),
            message: "must not be empty".to_string(),
        });
    }
    if name.contains('/') {
        return Err(ProviderError::InvalidField {
            field: field.to_string(),
            message: format!("'{name}' must not contain '/'"),
        });
    }
    Ok(())
}
