//! `chef_data_bag` resource.

use crate::entity::{DataBag, EntityKind, Locator};
use crate::error::ProviderResult;
use crate::record::DeclaredRecord;
use crate::schema::{FieldSchema, ResourceSchema};

use super::{check_name, required_scalar, Resource};

const NAME: &str = "name";

/// Data bags carry nothing but their name.
#[derive(Debug, Clone)]
pub struct DataBagResource {
    schema: ResourceSchema,
}

impl DataBagResource {
    pub fn new() -> Self {
        let schema = ResourceSchema::new("chef_data_bag")
            .with_field(FieldSchema::scalar(NAME).required().force_new());

        Self { schema }
    }
}

impl Default for DataBagResource {
    fn default() -> Self {
        Self::new()
    }
}

impl Resource for DataBagResource {
    type Entity = DataBag;

    fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    fn locate(&self, id: &str, _record: &DeclaredRecord) -> ProviderResult<Locator> {
        check_name(NAME, id)?;
        Ok(Locator::new(EntityKind::DataBag, id))
    }

    fn to_remote(&self, record: &DeclaredRecord) -> ProviderResult<DataBag> {
        let name = required_scalar(record, NAME)?;
        check_name(NAME, name)?;
        Ok(DataBag {
            name: name.to_string(),
        })
    }

    fn from_remote(&self, bag: &DataBag) -> ProviderResult<DeclaredRecord> {
        Ok(DeclaredRecord::new().with(NAME, bag.name.as_str()))
    }
}
