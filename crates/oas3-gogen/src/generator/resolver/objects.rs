use std::collections::BTreeSet;

use oas3::spec::{BooleanSchema, ObjectOrReference, ObjectSchema, Schema};
use regex::Regex;

use super::{ResolveContext, SchemaResolver, unions};
use crate::{
  generator::{
    ast::{GoType, Property, TypeDefinition},
    constraints::FieldContext,
    extensions::Extensions,
    metrics::GenerationWarning,
    naming::identifiers::go_type_name,
  },
  utils::SchemaExt,
};

/// Object construction: properties, additional properties, and union
/// delegation, per the full decision list for object-kind nodes.
pub(crate) fn resolve_object(
  resolver: &mut SchemaResolver<'_>,
  schema: &ObjectSchema,
  ctx: &ResolveContext,
) -> anyhow::Result<GoType> {
  let ext = Extensions::new(&schema.extensions);

  // Nothing to build a struct from: degrade to a generic map when the node
  // explicitly says "object", or to the top type when it says nothing.
  if !schema.has_object_structure() {
    if schema.single_type().is_some() {
      return Ok(generic_map(GoType::any()));
    }
    return Ok(GoType::any());
  }

  let additional = resolve_additional_properties(resolver, schema, ctx)?;

  // Pure dictionary: no declared properties, no union. Never wrapped in a
  // one-field carrier struct.
  if schema.properties.is_empty() && !schema.has_union() {
    if let Some(mut value) = additional {
      let defs = value.take_additional_defs();
      let mut result = map_of(value);
      result.additional_defs = defs;
      return finish(resolver, result, &ext, ctx);
    }
  }

  let mut result = GoType::default();
  let mut aux = vec![];
  let mut used_names = BTreeSet::new();

  for (json_name, prop_ref) in &schema.properties {
    let property = resolve_property(resolver, schema, json_name, prop_ref, ctx, &mut used_names, &mut aux)?;
    result.properties.push(property);
  }

  if let Some(mut value) = additional {
    aux.append(&mut value.take_additional_defs());
    result.has_additional_properties = true;
    result.map_value = Some(Box::new(value));
  }

  if schema.has_union() {
    let branches = if schema.one_of.is_empty() {
      &schema.any_of
    } else {
      &schema.one_of
    };
    let mut union = unions::resolve_union(resolver, branches, schema.discriminator.as_ref(), ctx)?;

    if result.properties.is_empty() && result.map_value.is_none() {
      // The union is the whole result (or collapsed to a single branch).
      union.additional_defs.extend(aux);
      return finish(resolver, union, &ext, ctx);
    }

    // A schema can carry direct properties and a union branch at once;
    // both are represented on one descriptor.
    aux.append(&mut union.take_additional_defs());
    result.union_elements = union.union_elements;
    result.discriminator = union.discriminator;
    result.constraints.nullable |= union.constraints.nullable;
  }

  result.additional_defs = aux;
  if !resolver.config.omit_descriptions
    && let Some(ref description) = schema.description
  {
    result.docs = crate::utils::doc_lines(description);
  }
  result.render_struct_literal(resolver.config.skip_validation_tags);

  finish(resolver, result, &ext, ctx)
}

/// Applies the whole-type rename wrap, if declared.
fn finish(
  resolver: &mut SchemaResolver<'_>,
  result: GoType,
  ext: &Extensions<'_>,
  ctx: &ResolveContext,
) -> anyhow::Result<GoType> {
  match ext.type_name_override()? {
    Some(name) => {
      let mut alias = resolver.hoist(result, &go_type_name(&name), &[], ctx.location, None);
      alias.define_via_alias = true;
      Ok(alias)
    }
    None => Ok(result),
  }
}

fn generic_map(value: GoType) -> GoType {
  let mut out = map_of(value);
  out.has_additional_properties = false;
  out
}

fn map_of(value: GoType) -> GoType {
  GoType {
    type_name: format!("map[string]{}", value.type_decl()),
    define_via_alias: true,
    is_primitive_alias: true,
    has_additional_properties: true,
    map_value: Some(Box::new(value)),
    ..GoType::default()
  }
}

fn resolve_additional_properties(
  resolver: &mut SchemaResolver<'_>,
  schema: &ObjectSchema,
  ctx: &ResolveContext,
) -> anyhow::Result<Option<GoType>> {
  match schema.additional_properties {
    None => Ok(None),
    Some(Schema::Boolean(BooleanSchema(false))) => Ok(None),
    Some(Schema::Boolean(BooleanSchema(true))) => Ok(Some(GoType::any())),
    Some(Schema::Object(ref obj_ref)) => {
      let value_ctx = ctx.child("Value");
      let mut value = resolver.resolve_ref(obj_ref, &value_ctx)?;
      if value.is_structurally_complex() && !value.is_reference() {
        value = resolver.hoist(value, &value_ctx.type_name(), &[], ctx.location, None);
      }
      Ok(Some(value))
    }
  }
}

#[allow(clippy::too_many_arguments)]
fn resolve_property(
  resolver: &mut SchemaResolver<'_>,
  parent: &ObjectSchema,
  json_name: &str,
  prop_ref: &ObjectOrReference<ObjectSchema>,
  ctx: &ResolveContext,
  used_names: &mut BTreeSet<String>,
  aux: &mut Vec<TypeDefinition>,
) -> anyhow::Result<Property> {
  let prop_ctx = ctx.child(&go_type_name(json_name));
  let mut descriptor = resolver.resolve_ref(prop_ref, &prop_ctx)?;

  // Facets, extensions, and docs come from the resolved schema node even
  // when the property is declared via reference. Deep-path references are
  // not resolvable through the document index; those keep empty facets.
  let facets = match prop_ref {
    ObjectOrReference::Object(inline) => inline.clone(),
    ObjectOrReference::Ref { .. } => prop_ref.resolve(resolver.spec()).unwrap_or_default(),
  };

  if let Some(ref pattern) = facets.pattern
    && Regex::new(pattern).is_err()
  {
    resolver.stats.record_warning(GenerationWarning::InvalidPatternRegex {
      property: json_name.to_string(),
      pattern: pattern.clone(),
    });
  }

  let field_ctx = FieldContext {
    required_in_parent: parent.required.iter().any(|r| r == json_name),
    has_explicit_null: facets.declares_null(),
  };
  let constraints = resolver.constraints.resolve(&facets, field_ctx);

  // Complex unnamed property types are promoted to auxiliary named types
  // keyed by their structural path.
  if (!descriptor.properties.is_empty() || !descriptor.union_elements.is_empty() || !descriptor.enum_entries.is_empty())
    && !descriptor.is_reference()
  {
    descriptor = resolver.hoist(descriptor, &prop_ctx.type_name(), &[], ctx.location, None);
  }
  aux.append(&mut descriptor.take_additional_defs());

  let ext = Extensions::new(&facets.extensions);
  descriptor.skip_optional_pointer |= ext.skip_optional_pointer()?.unwrap_or(false);

  let go_name = field_go_name(json_name, &ext, used_names)?;
  used_names.insert(go_name.clone());

  let mut extra_tags = ext.extra_tags()?.unwrap_or_default();
  if let Some(tag) = ext.jsonschema_tag()? {
    extra_tags.entry("jsonschema".to_string()).or_insert(tag);
  }
  for (tag, source) in &resolver.config.auto_extra_tags {
    let value = if source == "description" {
      facets.description.clone()
    } else {
      ext.raw(source).and_then(|v| v.as_str().map(ToString::to_string))
    };
    if let Some(value) = value {
      extra_tags.entry(tag.clone()).or_insert(value);
    }
  }

  let deprecation_reason = ext.deprecation_reason()?;
  let deprecated = facets.deprecated.unwrap_or(false) || deprecation_reason.is_some();

  let docs = if resolver.config.omit_descriptions {
    vec![]
  } else {
    facets
      .description
      .as_deref()
      .map(crate::utils::doc_lines)
      .unwrap_or_default()
  };

  Ok(Property {
    go_name,
    json_name: json_name.to_string(),
    schema: descriptor,
    constraints,
    extra_tags,
    json_ignore: ext.json_ignore()?.unwrap_or(false),
    omit_empty_override: ext.omit_empty()?,
    sensitive: ext.sensitive()?,
    deprecated,
    deprecation_reason,
    docs,
  })
}

/// Picks the exported Go field name: a rename extension wins, falling back
/// to the derived name on sibling collisions unless the strict flag says to
/// keep the rename regardless.
fn field_go_name(json_name: &str, ext: &Extensions<'_>, used_names: &BTreeSet<String>) -> anyhow::Result<String> {
  let derived = go_type_name(json_name);
  let strict = ext.field_rename_strict()?.unwrap_or(false);

  let mut name = match ext.field_rename()? {
    Some(rename) if strict || !used_names.contains(&rename) => rename,
    Some(_) | None => derived,
  };

  if !strict {
    let base = name.clone();
    let mut counter = 1;
    while used_names.contains(&name) {
      name = format!("{base}{counter}");
      counter += 1;
    }
  }

  Ok(name)
}
