use oas3::spec::{ObjectSchema, SchemaType};

use super::{ResolveContext, SchemaResolver, primitives};
use crate::generator::{
  ast::{EnumEntry, GoType},
  extensions::Extensions,
  naming::identifiers::go_const_name,
};

/// Builds the constant table for a schema with declared enum values.
///
/// The result is always a nominal type (never a plain alias): enum identity
/// matters for type safety, and the renderer needs a named type to hang the
/// constants on.
pub(crate) fn resolve_enum(
  resolver: &mut SchemaResolver<'_>,
  schema: &ObjectSchema,
  kind: Option<SchemaType>,
  ctx: &ResolveContext,
) -> anyhow::Result<GoType> {
  let base_type = match kind {
    Some(SchemaType::Integer) => primitives::integer_type(resolver, schema),
    Some(SchemaType::Number) => "float64",
    Some(SchemaType::Boolean) => "bool",
    _ => primitives::string_type(schema),
  };

  let ext = Extensions::new(&schema.extensions);
  let override_names = ext.enum_var_names()?;

  let owner = ctx.type_name();
  let entries = schema
    .enum_values
    .iter()
    .enumerate()
    .map(|(index, value)| {
      let go_name = match override_names.as_ref().and_then(|names| names.get(index)) {
        Some(name) => name.clone(),
        None => derived_constant_name(resolver, &owner, value),
      };
      EnumEntry {
        go_name,
        value: value.clone(),
      }
    })
    .collect();

  Ok(GoType {
    type_name: base_type.to_string(),
    enum_entries: entries,
    ..GoType::default()
  })
}

fn derived_constant_name(resolver: &SchemaResolver<'_>, owner: &str, value: &serde_json::Value) -> String {
  let literal = match value {
    serde_json::Value::String(s) => s.clone(),
    other => other.to_string(),
  };
  let constant = go_const_name(&literal);
  if resolver.config.always_prefix_enum_values {
    format!("{owner}{constant}")
  } else {
    constant
  }
}
