use oas3::spec::{ObjectSchema, SchemaType};

use super::{ResolveContext, SchemaResolver, objects};
use crate::{generator::ast::GoType, utils::SchemaExt};

/// Maps a scalar or array kind to its Go target type. All scalar results are
/// declared as type aliases: validation for primitives is applied via tags at
/// the containing object level, never through a dedicated method.
pub(crate) fn resolve_primitive(
  resolver: &mut SchemaResolver<'_>,
  schema: &ObjectSchema,
  kind: SchemaType,
  ctx: &ResolveContext,
) -> anyhow::Result<GoType> {
  match kind {
    SchemaType::Boolean => Ok(GoType::primitive("bool")),
    SchemaType::Integer => Ok(GoType::primitive(integer_type(resolver, schema))),
    SchemaType::Number => Ok(GoType::primitive(number_type(resolver, schema))),
    SchemaType::String => Ok(GoType::primitive(string_type(schema))),
    SchemaType::Null => Ok(GoType::empty()),
    SchemaType::Array => resolve_array(resolver, schema, ctx),
    SchemaType::Object => objects::resolve_object(resolver, schema, ctx),
  }
}

/// The Go type for an integer schema, also reused by enum construction to
/// pick the constant table's underlying type.
pub(crate) fn integer_type(resolver: &SchemaResolver<'_>, schema: &ObjectSchema) -> &'static str {
  match schema.format.as_deref() {
    Some("int8") => "int8",
    Some("int16") => "int16",
    Some("int32") => "int32",
    Some("int64") => "int64",
    Some("uint8") => "uint8",
    Some("uint16") => "uint16",
    Some("uint32") => "uint32",
    Some("uint64") => "uint64",
    Some("uint") => "uint",
    _ => resolver.config.default_integer_width.as_go_type(),
  }
}

fn number_type(resolver: &SchemaResolver<'_>, schema: &ObjectSchema) -> &'static str {
  match schema.format.as_deref() {
    Some("double") => "float64",
    // Non-standard but seen in the wild; widest float is the safe reading.
    Some("decimal") => "float64",
    Some("float") => "float32",
    // Lenient-spec compatibility: `type: number, format: int*` means the
    // author wanted an integer.
    Some("integer" | "int" | "int32" | "int64") => resolver.config.default_integer_width.as_go_type(),
    _ => "float32",
  }
}

pub(crate) fn string_type(schema: &ObjectSchema) -> &'static str {
  match schema.format.as_deref() {
    Some("byte") => "[]byte",
    Some("email") => "types.Email",
    Some("date") => "types.Date",
    // Enum constants must stay literal strings; a timestamp type cannot
    // hold them.
    Some("date-time") if schema.enum_values.is_empty() => "time.Time",
    Some("binary") => "types.File",
    Some("uuid") => "types.UUID",
    _ => "string",
  }
}

/// Arrays resolve their item schema recursively; a structurally complex
/// inline item type is hoisted to a path-derived name with an `Item` suffix.
/// Nested arrays skip the hoist so `[][]T` never grows a spurious
/// intermediate name.
fn resolve_array(
  resolver: &mut SchemaResolver<'_>,
  schema: &ObjectSchema,
  ctx: &ResolveContext,
) -> anyhow::Result<GoType> {
  // Items declared via a direct reference keep the current path: the
  // reference already carries its own name. A missing or boolean items
  // schema degrades to the generic element type.
  let items_ref = schema.items_object();
  let is_reference = matches!(items_ref, Some(oas3::spec::ObjectOrReference::Ref { .. }));
  let item_ctx = if is_reference { ctx.clone() } else { ctx.child("Item") };
  let mut item = resolver.resolve_optional(items_ref, &item_ctx)?;

  let item_is_array = item.array_element.is_some();
  if !is_reference && item.is_structurally_complex() && !item.is_reference() && !item_is_array {
    let base = resolver.tracker.generate_unique_base_name(&ctx.type_name(), "Item");
    item = resolver.hoist(item, &format!("{base}Item"), &[], ctx.location, None);
  }

  let mut out = GoType {
    type_name: format!("[]{}", item.type_decl()),
    define_via_alias: true,
    is_primitive_alias: true,
    additional_defs: item.take_additional_defs(),
    ..GoType::default()
  };
  out.array_element = Some(Box::new(item));
  Ok(out)
}
