//! `chef_node` resource.

use crate::entity::{EntityKind, Locator, Node};
use crate::error::ProviderResult;
use crate::record::{DeclaredRecord, FieldValue};
use crate::schema::{FieldSchema, ResourceSchema};

use super::{check_name, decode_attributes, encode_attributes, required_scalar, run_list, Resource};

const NAME: &str = "name";
const ENVIRONMENT_NAME: &str = "environment_name";
const AUTOMATIC_ATTRIBUTES: &str = "automatic_attributes_json";
const NORMAL_ATTRIBUTES: &str = "normal_attributes_json";
const DEFAULT_ATTRIBUTES: &str = "default_attributes_json";
const OVERRIDE_ATTRIBUTES: &str = "override_attributes_json";
const RUN_LIST: &str = "run_list";

/// Nodes, with their four attribute namespaces and run list.
///
/// Deleting a node also removes the API client of the same name, which
/// would otherwise hold a stale key when the node is bootstrapped again.
#[derive(Debug, Clone)]
pub struct NodeResource {
    schema: ResourceSchema,
}

impl NodeResource {
    pub fn new() -> Self {
        let schema = ResourceSchema::new("chef_node")
            .with_field(FieldSchema::scalar(NAME).required().force_new())
            .with_field(FieldSchema::scalar(ENVIRONMENT_NAME).with_default("_default".into()))
            .with_field(FieldSchema::json_object(AUTOMATIC_ATTRIBUTES))
            .with_field(FieldSchema::json_object(NORMAL_ATTRIBUTES))
            .with_field(FieldSchema::json_object(DEFAULT_ATTRIBUTES))
            .with_field(FieldSchema::json_object(OVERRIDE_ATTRIBUTES))
            .with_field(FieldSchema::run_list(RUN_LIST));

        Self { schema }
    }
}

impl Default for NodeResource {
    fn default() -> Self {
        Self::new()
    }
}

impl Resource for NodeResource {
    type Entity = Node;

    fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    fn locate(&self, id: &str, _record: &DeclaredRecord) -> ProviderResult<Locator> {
        check_name(NAME, id)?;
        Ok(Locator::new(EntityKind::Node, id))
    }

    fn to_remote(&self, record: &DeclaredRecord) -> ProviderResult<Node> {
        let name = required_scalar(record, NAME)?;
        check_name(NAME, name)?;

        let mut node = Node::new(name);
        if let Some(environment) = record.scalar(ENVIRONMENT_NAME) {
            node.environment = environment.to_string();
        }
        node.automatic_attributes = decode_attributes(record, AUTOMATIC_ATTRIBUTES)?;
        node.normal_attributes = decode_attributes(record, NORMAL_ATTRIBUTES)?;
        node.default_attributes = decode_attributes(record, DEFAULT_ATTRIBUTES)?;
        node.override_attributes = decode_attributes(record, OVERRIDE_ATTRIBUTES)?;
        node.run_list = run_list(record, RUN_LIST);

        Ok(node)
    }

    fn from_remote(&self, node: &Node) -> ProviderResult<DeclaredRecord> {
        Ok(DeclaredRecord::new()
            .with(NAME, node.name.as_str())
            .with(ENVIRONMENT_NAME, node.environment.as_str())
            .with(
                AUTOMATIC_ATTRIBUTES,
                encode_attributes(AUTOMATIC_ATTRIBUTES, &node.automatic_attributes)?,
            )
            .with(
                NORMAL_ATTRIBUTES,
                encode_attributes(NORMAL_ATTRIBUTES, &node.normal_attributes)?,
            )
            .with(
                DEFAULT_ATTRIBUTES,
                encode_attributes(DEFAULT_ATTRIBUTES, &node.default_attributes)?,
            )
            .with(
                OVERRIDE_ATTRIBUTES,
                encode_attributes(OVERRIDE_ATTRIBUTES, &node.override_attributes)?,
            )
            .with(RUN_LIST, FieldValue::List(node.run_list.clone())))
    }

    fn purges_auxiliary(&self) -> bool {
        true
    }
}
