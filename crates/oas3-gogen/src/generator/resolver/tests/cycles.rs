use oas3::spec::{ObjectOrReference, ObjectSchema};
use serde_json::json;

use super::support::spec_with_schemas;
use crate::generator::{
  GeneratorConfig,
  resolver::{ResolveContext, SchemaResolver},
};

#[test]
fn test_self_referential_component_terminates() -> anyhow::Result<()> {
  let spec = spec_with_schemas(json!({
    "Node": {
      "type": "object",
      "properties": {
        "value": { "type": "string" },
        "next": { "$ref": "#/components/schemas/Node" }
      }
    }
  }));
  let config = GeneratorConfig::default();
  let mut resolver = SchemaResolver::new(&spec, &config);

  let schema: ObjectSchema = spec.components.as_ref().unwrap().schemas["Node"]
    .clone()
    .resolve(&spec)?;
  let out = resolver.resolve_schema(&schema, &ResolveContext::component("Node"))?;

  let next = out
    .properties
    .iter()
    .find(|p| p.json_name == "next")
    .expect("next property should be present");
  assert_eq!(next.schema.type_decl(), "Node");
  assert!(next.uses_pointer(), "self-reference must sit behind a pointer");
  Ok(())
}

#[test]
fn test_mutually_recursive_components_terminate() -> anyhow::Result<()> {
  let spec = spec_with_schemas(json!({
    "Forward": {
      "type": "object",
      "properties": { "back": { "$ref": "#/components/schemas/Backward" } }
    },
    "Backward": {
      "type": "object",
      "properties": { "forward": { "$ref": "#/components/schemas/Forward" } }
    }
  }));
  let config = GeneratorConfig::default();
  let mut resolver = SchemaResolver::new(&spec, &config);

  let schema: ObjectSchema = spec.components.as_ref().unwrap().schemas["Forward"]
    .clone()
    .resolve(&spec)?;
  let out = resolver.resolve_schema(&schema, &ResolveContext::component("Forward"))?;

  assert_eq!(out.properties[0].schema.type_decl(), "Backward");
  Ok(())
}

#[test]
fn test_recursive_deep_reference_reuses_the_reserved_name() -> anyhow::Result<()> {
  let spec = spec_with_schemas(json!({
    "Tree": {
      "type": "object",
      "properties": {
        "child": {
          "type": "object",
          "properties": {
            "value": { "type": "string" },
            "next": { "$ref": "#/components/schemas/Tree/properties/child" }
          }
        }
      }
    }
  }));
  let config = GeneratorConfig::default();
  let mut resolver = SchemaResolver::new(&spec, &config);
  let ctx = ResolveContext::component("Holder");

  let reference = ObjectOrReference::<ObjectSchema>::Ref {
    ref_path: "#/components/schemas/Tree/properties/child".to_string(),
    summary: None,
    description: None,
  };
  let out = resolver.resolve_ref(&reference, &ctx)?;

  assert_eq!(out.named_ref.as_deref(), Some("TreeChild"));
  assert_eq!(out.additional_defs.len(), 1);
  let def = &out.additional_defs[0];
  assert_eq!(def.name, "TreeChild");

  // The inner self-reference resolved to the same reserved name instead of
  // minting a second one.
  let next = def
    .schema
    .properties
    .iter()
    .find(|p| p.json_name == "next")
    .expect("next property should be present");
  assert_eq!(next.schema.type_decl(), "TreeChild");
  Ok(())
}

#[test]
fn test_sibling_subtrees_do_not_inherit_visited_marks() -> anyhow::Result<()> {
  // The same inline shape appears in two sibling properties; the cycle
  // guard must not mistake the second for a revisit.
  let spec = spec_with_schemas(json!({}));
  let config = GeneratorConfig::default();
  let mut resolver = SchemaResolver::new(&spec, &config);

  let schema: ObjectSchema = serde_json::from_value(json!({
    "type": "object",
    "properties": {
      "home": { "type": "object", "properties": { "city": { "type": "string" } } },
      "work": { "type": "object", "properties": { "city": { "type": "string" } } }
    }
  }))?;
  let out = resolver.resolve_schema(&schema, &ResolveContext::component("Contact"))?;

  assert_eq!(out.additional_defs.len(), 2);
  let names: Vec<_> = out.additional_defs.iter().map(|d| d.name.as_str()).collect();
  assert_eq!(names, vec!["ContactHome", "ContactWork"]);
  Ok(())
}
