//! `chef_environment` resource.

use crate::entity::{EntityKind, Environment, Locator};
use crate::error::ProviderResult;
use crate::record::{DeclaredRecord, FieldValue};
use crate::schema::{FieldSchema, ResourceSchema};

use super::{
    check_name, decode_attributes, encode_attributes, required_scalar, Resource,
    DEFAULT_DESCRIPTION,
};

const NAME: &str = "name";
const DESCRIPTION: &str = "description";
const DEFAULT_ATTRIBUTES: &str = "default_attributes_json";
const OVERRIDE_ATTRIBUTES: &str = "override_attributes_json";
const COOKBOOK_CONSTRAINTS: &str = "cookbook_constraints";

/// Environments pin cookbook versions (`cookbook_constraints`) instead of
/// carrying a run list.
#[derive(Debug, Clone)]
pub struct EnvironmentResource {
    schema: ResourceSchema,
}

impl EnvironmentResource {
    pub fn new() -> Self {
        let schema = ResourceSchema::new("chef_environment")
            .with_field(FieldSchema::scalar(NAME).required().force_new())
            .with_field(FieldSchema::scalar(DESCRIPTION).with_default(DEFAULT_DESCRIPTION.into()))
            .with_field(FieldSchema::json_object(DEFAULT_ATTRIBUTES))
            .with_field(FieldSchema::json_object(OVERRIDE_ATTRIBUTES))
            .with_field(FieldSchema::string_map(COOKBOOK_CONSTRAINTS));

        Self { schema }
    }
}

impl Default for EnvironmentResource {
    fn default() -> Self {
        Self::new()
    }
}

impl Resource for EnvironmentResource {
    type Entity = Environment;

    fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    fn locate(&self, id: &str, _record: &DeclaredRecord) -> ProviderResult<Locator> {
        check_name(NAME, id)?;
        Ok(Locator::new(EntityKind::Environment, id))
    }

    fn to_remote(&self, record: &DeclaredRecord) -> ProviderResult<Environment> {
        let name = required_scalar(record, NAME)?;
        check_name(NAME, name)?;

        let mut environment = Environment::new(name);
        environment.description = record.scalar(DESCRIPTION).unwrap_or_default().to_string();
        environment.default_attributes = decode_attributes(record, DEFAULT_ATTRIBUTES)?;
        environment.override_attributes = decode_attributes(record, OVERRIDE_ATTRIBUTES)?;
        environment.cookbook_versions = record
            .map(COOKBOOK_CONSTRAINTS)
            .cloned()
            .unwrap_or_default();

        Ok(environment)
    }

    fn from_remote(&self, environment: &Environment) -> ProviderResult<DeclaredRecord> {
        Ok(DeclaredRecord::new()
            .with(NAME, environment.name.as_str())
            .with(DESCRIPTION, environment.description.as_str())
            .with(
                DEFAULT_ATTRIBUTES,
                encode_attributes(DEFAULT_ATTRIBUTES, &environment.default_attributes)?,
            )
            .with(
                OVERRIDE_ATTRIBUTES,
                encode_attributes(OVERRIDE_ATTRIBUTES, &environment.override_attributes)?,
            )
            .with(
                COOKBOOK_CONSTRAINTS,
                FieldValue::Map(environment.cookbook_versions.clone()),
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookbook_constraints_map_to_versions() {
        let resource = EnvironmentResource::new();
        let declared = DeclaredRecord::new()
            .with("name", "production")
            .with(
                "cookbook_constraints",
                FieldValue::map([("apache2", ">= 1.2.0"), ("mysql", "= 8.0.1")]),
            );

        let record = resource.schema().prepare(&declared).unwrap();
        let environment = resource.to_remote(&record).unwrap();

        assert_eq!(environment.json_class, "Chef::Environment");
        assert_eq!(environment.cookbook_versions["apache2"], ">= 1.2.0");
        assert_eq!(environment.cookbook_versions.len(), 2);

        let back = resource.from_remote(&environment).unwrap();
        assert_eq!(back.map("cookbook_constraints"), record.map("cookbook_constraints"));
        assert_eq!(back.scalar("description"), Some(DEFAULT_DESCRIPTION));
    }
}
