//! `chef_role` resource.

use crate::entity::{EntityKind, Locator, Role};
use crate::error::ProviderResult;
use crate::record::{DeclaredRecord, FieldValue};
use crate::schema::{FieldSchema, ResourceSchema};

use super::{
    check_name, decode_attributes, encode_attributes, required_scalar, run_list, Resource,
    DEFAULT_DESCRIPTION,
};

const NAME: &str = "name";
const DESCRIPTION: &str = "description";
const DEFAULT_ATTRIBUTES: &str = "default_attributes_json";
const OVERRIDE_ATTRIBUTES: &str = "override_attributes_json";
const RUN_LIST: &str = "run_list";

#[derive(Debug, Clone)]
pub struct RoleResource {
    schema: ResourceSchema,
}

impl RoleResource {
    pub fn new() -> Self {
        let schema = ResourceSchema::new("chef_role")
            .with_field(FieldSchema::scalar(NAME).required().force_new())
            .with_field(FieldSchema::scalar(DESCRIPTION).with_default(DEFAULT_DESCRIPTION.into()))
            .with_field(FieldSchema::json_object(DEFAULT_ATTRIBUTES))
            .with_field(FieldSchema::json_object(OVERRIDE_ATTRIBUTES))
            .with_field(FieldSchema::run_list(RUN_LIST));

        Self { schema }
    }
}

impl Default for RoleResource {
    fn default() -> Self {
        Self::new()
    }
}

impl Resource for RoleResource {
    type Entity = Role;

    fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    fn locate(&self, id: &str, _record: &DeclaredRecord) -> ProviderResult<Locator> {
        check_name(NAME, id)?;
        Ok(Locator::new(EntityKind::Role, id))
    }

    fn to_remote(&self, record: &DeclaredRecord) -> ProviderResult<Role> {
        let name = required_scalar(record, NAME)?;
        check_name(NAME, name)?;

        let mut role = Role::new(name);
        role.description = record.scalar(DESCRIPTION).unwrap_or_default().to_string();
        role.default_attributes = decode_attributes(record, DEFAULT_ATTRIBUTES)?;
        role.override_attributes = decode_attributes(record, OVERRIDE_ATTRIBUTES)?;
        role.run_list = run_list(record, RUN_LIST);

        Ok(role)
    }

    fn from_remote(&self, role: &Role) -> ProviderResult<DeclaredRecord> {
        Ok(DeclaredRecord::new()
            .with(NAME, role.name.as_str())
            .with(DESCRIPTION, role.description.as_str())
            .with(
                DEFAULT_ATTRIBUTES,
                encode_attributes(DEFAULT_ATTRIBUTES, &role.default_attributes)?,
            )
            .with(
                OVERRIDE_ATTRIBUTES,
                encode_attributes(OVERRIDE_ATTRIBUTES, &role.override_attributes)?,
            )
            .with(RUN_LIST, FieldValue::List(role.run_list.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_defaults() {
        let resource = RoleResource::new();
        let record = resource
            .schema()
            .prepare(&DeclaredRecord::new().with("name", "web"))
            .unwrap();
        let role = resource.to_remote(&record).unwrap();

        assert_eq!(role.description, DEFAULT_DESCRIPTION);
        assert_eq!(role.json_class, "Chef::Role");
        assert!(role.run_list.is_empty());
        assert!(role.env_run_lists.is_empty());
    }

    #[test]
    fn test_role_round_trip() {
        let resource = RoleResource::new();
        let schema = resource.schema();
        let declared = DeclaredRecord::new()
            .with("name", "web")
            .with("description", "Web servers")
            .with("default_attributes_json", FieldValue::json(r#"{ "port": 443 }"#))
            .with("run_list", FieldValue::list(["nginx", "recipe[app::deploy]"]));

        let mut expected = schema.prepare(&declared).unwrap();
        let mut actual = resource
            .from_remote(&resource.to_remote(&expected).unwrap())
            .unwrap();

        schema.canonicalize(&mut expected);
        schema.canonicalize(&mut actual);
        assert_eq!(actual, expected);
        assert_eq!(
            actual.list("run_list").unwrap(),
            &["recipe[nginx]".to_string(), "recipe[app::deploy]".to_string()]
        );
    }
}
