use oas3::spec::{BooleanSchema, ObjectSchema, Schema, SchemaType, SchemaTypeSet};
use serde_json::json;

use super::support::{empty_spec, inline, object_schema, typed};
use crate::generator::{
  GeneratorConfig,
  ast::GoType,
  errors::ResolveError,
  extensions::MaskStrategy,
  resolver::{ResolveContext, SchemaResolver},
};

fn resolve(schema: &ObjectSchema, component: &str) -> anyhow::Result<GoType> {
  let spec = empty_spec();
  let config = GeneratorConfig::default();
  let mut resolver = SchemaResolver::new(&spec, &config);
  resolver.resolve_schema(schema, &ResolveContext::component(component))
}

#[test]
fn test_struct_literal_fields_and_tags() -> anyhow::Result<()> {
  let schema = object_schema(
    &[
      ("name", inline(typed(SchemaType::String))),
      ("tag", inline(typed(SchemaType::String))),
    ],
    &["name"],
  );
  let out = resolve(&schema, "Pet")?;

  assert_eq!(out.properties.len(), 2);
  assert!(
    out.type_name.contains("\tName string `json:\"name\" validate:\"required\"`"),
    "required field rendered without pointer: {}",
    out.type_name
  );
  assert!(
    out.type_name.contains("\tTag *string `json:\"tag,omitempty\"`"),
    "optional field rendered behind a pointer: {}",
    out.type_name
  );
  Ok(())
}

#[test]
fn test_nested_inline_object_is_hoisted() -> anyhow::Result<()> {
  let address = object_schema(&[("city", inline(typed(SchemaType::String)))], &[]);
  let schema = object_schema(&[("address", inline(address))], &[]);
  let out = resolve(&schema, "Pet")?;

  assert_eq!(out.additional_defs.len(), 1);
  assert_eq!(out.additional_defs[0].name, "PetAddress");
  assert_eq!(out.properties[0].schema.type_decl(), "PetAddress");
  Ok(())
}

#[test]
fn test_pure_map_is_never_wrapped_in_a_struct() -> anyhow::Result<()> {
  let mut schema = typed(SchemaType::Object);
  schema.additional_properties = Some(Schema::Object(Box::new(inline(typed(SchemaType::String)))));
  let out = resolve(&schema, "Labels")?;

  assert_eq!(out.type_name, "map[string]string");
  assert!(out.define_via_alias);
  assert!(out.has_additional_properties);
  assert!(out.properties.is_empty());
  Ok(())
}

#[test]
fn test_additional_properties_false_is_inert() -> anyhow::Result<()> {
  let mut schema = object_schema(&[("id", inline(typed(SchemaType::Integer)))], &[]);
  schema.additional_properties = Some(Schema::Boolean(BooleanSchema(false)));
  let out = resolve(&schema, "Strict")?;

  assert!(out.map_value.is_none());
  assert!(!out.has_additional_properties);
  Ok(())
}

#[test]
fn test_declared_object_without_structure_degrades_to_generic_map() -> anyhow::Result<()> {
  let out = resolve(&typed(SchemaType::Object), "Blob")?;
  assert_eq!(out.type_name, "map[string]any");
  assert!(!out.has_additional_properties);
  Ok(())
}

#[test]
fn test_type_override_extension_bypasses_inference() -> anyhow::Result<()> {
  let mut schema = object_schema(&[("ignored", inline(typed(SchemaType::String)))], &[]);
  schema
    .extensions
    .insert("x-go-type".to_string(), json!("decimal.Decimal"));
  let out = resolve(&schema, "Money")?;

  assert_eq!(out.type_name, "decimal.Decimal");
  assert!(out.is_primitive_alias);
  assert!(out.properties.is_empty());
  Ok(())
}

#[test]
fn test_type_name_override_wraps_in_named_alias() -> anyhow::Result<()> {
  let mut schema = object_schema(&[("id", inline(typed(SchemaType::Integer)))], &[]);
  schema
    .extensions
    .insert("x-go-type-name".to_string(), json!("RenamedThing"));
  let out = resolve(&schema, "Original")?;

  assert_eq!(out.named_ref.as_deref(), Some("RenamedThing"));
  assert!(out.define_via_alias);
  assert_eq!(out.additional_defs.len(), 1);
  assert_eq!(out.additional_defs[0].name, "RenamedThing");
  Ok(())
}

#[test]
fn test_field_rename_collision_falls_back_to_derived_name() -> anyhow::Result<()> {
  let mut first = typed(SchemaType::String);
  first.extensions.insert("x-go-name".to_string(), json!("Value"));
  let mut second = typed(SchemaType::String);
  second.extensions.insert("x-go-name".to_string(), json!("Value"));

  let schema = object_schema(&[("alpha", inline(first)), ("beta", inline(second))], &[]);
  let out = resolve(&schema, "Pair")?;

  let names: Vec<_> = out.properties.iter().map(|p| p.go_name.as_str()).collect();
  assert_eq!(names, vec!["Value", "Beta"]);
  Ok(())
}

#[test]
fn test_strict_field_rename_keeps_collision() -> anyhow::Result<()> {
  let mut first = typed(SchemaType::String);
  first.extensions.insert("x-go-name".to_string(), json!("Value"));
  let mut second = typed(SchemaType::String);
  second.extensions.insert("x-go-name".to_string(), json!("Value"));
  second.extensions.insert("x-go-name-strict".to_string(), json!(true));

  let schema = object_schema(&[("alpha", inline(first)), ("beta", inline(second))], &[]);
  let out = resolve(&schema, "Pair")?;

  let names: Vec<_> = out.properties.iter().map(|p| p.go_name.as_str()).collect();
  assert_eq!(names, vec!["Value", "Value"]);
  Ok(())
}

#[test]
fn test_sensitive_extension_lands_on_property() -> anyhow::Result<()> {
  let mut secret = typed(SchemaType::String);
  secret
    .extensions
    .insert("x-sensitive".to_string(), json!({ "strategy": "partial", "shown": 2 }));
  let schema = object_schema(&[("token", inline(secret))], &[]);
  let out = resolve(&schema, "Credentials")?;

  assert_eq!(out.properties[0].sensitive, Some(MaskStrategy::Partial { shown: 2 }));
  Ok(())
}

#[test]
fn test_array_of_inline_objects_hoists_item_type() -> anyhow::Result<()> {
  let mut schema = typed(SchemaType::Array);
  schema.items = Some(Box::new(Schema::Object(Box::new(inline(object_schema(
    &[("code", inline(typed(SchemaType::Integer)))],
    &[],
  ))))));
  let out = resolve(&schema, "Errors")?;

  assert_eq!(out.type_name, "[]ErrorsItem");
  assert_eq!(out.additional_defs.len(), 1);
  assert_eq!(out.additional_defs[0].name, "ErrorsItem");
  Ok(())
}

#[test]
fn test_multi_type_set_beyond_nullable_pair_fails() {
  let schema = ObjectSchema {
    schema_type: Some(SchemaTypeSet::Multiple(vec![SchemaType::String, SchemaType::Integer])),
    ..Default::default()
  };
  let error = resolve(&schema, "Mixed").unwrap_err();
  assert_eq!(
    error.downcast_ref::<ResolveError>(),
    Some(&ResolveError::UnhandledKind("string|integer".to_string()))
  );
}

#[test]
fn test_kindless_schema_without_structure_is_any() -> anyhow::Result<()> {
  let out = resolve(&ObjectSchema::default(), "Anything")?;
  assert_eq!(out.type_name, "any");
  assert!(out.is_primitive_alias);
  Ok(())
}

#[test]
fn test_enum_valued_property_is_hoisted_as_named_type() -> anyhow::Result<()> {
  let status = ObjectSchema {
    enum_values: vec![json!("open"), json!("closed")],
    ..typed(SchemaType::String)
  };
  let schema = object_schema(&[("status", inline(status))], &[]);
  let out = resolve(&schema, "Ticket")?;

  assert_eq!(out.additional_defs.len(), 1);
  assert_eq!(out.additional_defs[0].name, "TicketStatus");
  assert_eq!(out.additional_defs[0].schema.enum_entries.len(), 2);
  assert_eq!(out.properties[0].schema.type_decl(), "TicketStatus");
  Ok(())
}
