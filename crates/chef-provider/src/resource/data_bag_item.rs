//! `chef_data_bag_item` resource.

use serde_json::Value;

use crate::entity::{DataBagItem, EntityKind, Locator};
use crate::error::{ProviderError, ProviderResult};
use crate::record::{DeclaredRecord, FieldValue};
use crate::schema::{FieldKind, FieldSchema, ResourceSchema};

use super::{check_name, decode_attributes, required_scalar, Resource};

const DATA_BAG_NAME: &str = "data_bag_name";
const CONTENT: &str = "content_json";
const CONTENT_ID: &str = "content_json.id";

/// Items are free-form JSON documents whose `id` key is the identity key.
///
/// Changing either the owning bag or the content `id` replaces the item;
/// everything else in the content is updated in place.
///
/// The owning bag comes from `data_bag_name`. Importing without a record
/// takes an identity of the form `<bag>/<item>`.
#[derive(Debug, Clone)]
pub struct DataBagItemResource {
    schema: ResourceSchema,
}

impl DataBagItemResource {
    pub fn new() -> Self {
        let schema = ResourceSchema::new("chef_data_bag_item")
            .with_field(FieldSchema::scalar(DATA_BAG_NAME).required().force_new())
            .with_field(FieldSchema::new(CONTENT, FieldKind::CanonicalJson).required());

        Self { schema }
    }
}

impl Default for DataBagItemResource {
    fn default() -> Self {
        Self::new()
    }
}

impl Resource for DataBagItemResource {
    type Entity = DataBagItem;

    fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    fn locate(&self, id: &str, record: &DeclaredRecord) -> ProviderResult<Locator> {
        let (bag, item) = match record.scalar(DATA_BAG_NAME) {
            Some(bag) => (bag, id),
            None => id.split_once('/').ok_or_else(|| ProviderError::MissingField {
                field: DATA_BAG_NAME.to_string(),
            })?,
        };

        check_name(DATA_BAG_NAME, bag)?;
        check_name("id", item)?;
        Ok(Locator::within(EntityKind::DataBagItem, bag, item))
    }

    fn identity_field(&self) -> &str {
        CONTENT_ID
    }

    fn replacement_fields(&self, prior: &DeclaredRecord, next: &DeclaredRecord) -> Vec<String> {
        let mut fields = self.schema.replacement_fields(prior, next);
        if content_id(prior) != content_id(next) {
            fields.push(CONTENT.to_string());
        }
        fields
    }

    fn to_remote(&self, record: &DeclaredRecord) -> ProviderResult<DataBagItem> {
        let data_bag = required_scalar(record, DATA_BAG_NAME)?;
        check_name(DATA_BAG_NAME, data_bag)?;

        if record.json(CONTENT).is_none() {
            return Err(ProviderError::MissingField {
                field: CONTENT.to_string(),
            });
        }
        let mut content = decode_attributes(record, CONTENT)?;

        let id = match content.remove("id") {
            Some(Value::String(id)) => id,
            _ => {
                return Err(ProviderError::InvalidField {
                    field: CONTENT.to_string(),
                    message: "must contain a string \"id\"".to_string(),
                })
            }
        };
        check_name(CONTENT_ID, &id)?;

        Ok(DataBagItem {
            data_bag: data_bag.to_string(),
            id,
            content,
        })
    }

    fn from_remote(&self, item: &DataBagItem) -> ProviderResult<DeclaredRecord> {
        let content = serde_json::to_string(item)
            .map_err(|e| ProviderError::serialization(format!("failed to encode {CONTENT}"), e))?;

        Ok(DeclaredRecord::new()
            .with(DATA_BAG_NAME, item.data_bag.as_str())
            .with(CONTENT, FieldValue::Json(content)))
    }
}

/// The `id` key of the declared content, if it is a string.
fn content_id(record: &DeclaredRecord) -> Option<String> {
    let text = record.json(CONTENT)?;
    match serde_json::from_str::<Value>(text).ok()?.get("id")? {
        Value::String(id) => Some(id.clone()),
        _ => None,
    }
}
