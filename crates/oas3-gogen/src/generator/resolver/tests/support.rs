use std::collections::BTreeMap;

use oas3::{
  Spec,
  spec::{ObjectOrReference, ObjectSchema, SchemaType, SchemaTypeSet},
};
use serde_json::{Value, json};

pub(super) fn empty_spec() -> Spec {
  spec_with_schemas(json!({}))
}

pub(super) fn spec_with_schemas(schemas: Value) -> Spec {
  serde_json::from_value(json!({
    "openapi": "3.1.0",
    "info": { "title": "fixture", "version": "0.0.0" },
    "components": { "schemas": schemas }
  }))
  .unwrap()
}

pub(super) fn make_schema_ref(name: &str) -> ObjectOrReference<ObjectSchema> {
  ObjectOrReference::Ref {
    ref_path: format!("#/components/schemas/{name}"),
    summary: None,
    description: None,
  }
}

pub(super) fn typed(schema_type: SchemaType) -> ObjectSchema {
  ObjectSchema {
    schema_type: Some(SchemaTypeSet::Single(schema_type)),
    ..Default::default()
  }
}

pub(super) fn inline(schema: ObjectSchema) -> ObjectOrReference<ObjectSchema> {
  ObjectOrReference::Object(schema)
}

pub(super) fn object_schema(
  properties: &[(&str, ObjectOrReference<ObjectSchema>)],
  required: &[&str],
) -> ObjectSchema {
  ObjectSchema {
    schema_type: Some(SchemaTypeSet::Single(SchemaType::Object)),
    properties: properties
      .iter()
      .map(|(name, schema_ref)| (name.to_string(), schema_ref.clone()))
      .collect::<BTreeMap<_, _>>(),
    required: required.iter().map(ToString::to_string).collect(),
    ..Default::default()
  }
}
