use std::collections::BTreeMap;

use oas3::spec::{Discriminator, ObjectOrReference, ObjectSchema};

use super::{ResolveContext, SchemaResolver};
use crate::{
  generator::{
    ast::{DeclaredLocation, DiscriminatorSpec, GoType, UnionElement},
    constraints::FieldContext,
    errors::ResolveError,
  },
  utils::{SchemaExt, refs::component_ref_name},
};

/// Resolves `oneOf`/`anyOf` branches into union elements.
///
/// The branch count after deduplication is a hard contract with the
/// renderer: exactly two elements render as an either-of-two carrier, three
/// or more as an opaque raw-payload carrier with runtime type dispatch.
pub(crate) fn resolve_union(
  resolver: &mut SchemaResolver<'_>,
  branches: &[ObjectOrReference<ObjectSchema>],
  discriminator: Option<&Discriminator>,
  ctx: &ResolveContext,
) -> anyhow::Result<GoType> {
  let remaining: Vec<&ObjectOrReference<ObjectSchema>> = branches.iter().filter(|b| !is_null_branch(b)).collect();
  let had_null = remaining.len() < branches.len();

  if remaining.is_empty() {
    let mut empty = GoType::empty();
    empty.constraints.nullable = had_null;
    return Ok(empty);
  }

  // A single surviving branch is never wrapped in a union. It still
  // resolves under its own branch context: under the parent's the visited
  // guard would mistake an inline branch for a re-entry of the parent.
  if let [only] = remaining[..] {
    let mut resolved = resolver.resolve_ref(only, &ctx.child("0"))?;
    if had_null {
      resolved.constraints.nullable = true;
    }
    return Ok(resolved);
  }

  let mut aux = vec![];
  let mut elements: Vec<UnionElement> = vec![];

  for (index, branch) in remaining.iter().enumerate() {
    let branch_ctx = ctx.child(&index.to_string());
    let mut descriptor = resolver.resolve_ref(branch, &branch_ctx)?;

    if let ObjectOrReference::Object(inline) = branch {
      descriptor.constraints = resolver.constraints.resolve(inline, FieldContext::default());
    }

    let is_reference_branch = matches!(branch, ObjectOrReference::Ref { .. });
    let non_primitive =
      descriptor.is_structurally_complex() || !descriptor.enum_entries.is_empty() || descriptor.has_additional_properties;
    if !is_reference_branch && !descriptor.is_reference() && non_primitive {
      descriptor = resolver.hoist(descriptor, &branch_ctx.type_name(), &[], DeclaredLocation::Union, None);
    }
    aux.append(&mut descriptor.take_additional_defs());

    elements.push(UnionElement {
      type_name: descriptor.type_decl().to_string(),
      schema: descriptor,
    });
  }

  let discriminator_spec = match discriminator {
    Some(disc) => Some(resolve_discriminator(resolver, disc, &remaining, &elements)?),
    None => None,
  };

  let elements = deduplicate(elements);

  let mut result = GoType {
    union_elements: elements,
    discriminator: discriminator_spec,
    additional_defs: aux,
    ..GoType::default()
  };
  result.constraints.nullable = had_null;
  Ok(result)
}

fn is_null_branch(branch: &ObjectOrReference<ObjectSchema>) -> bool {
  matches!(branch, ObjectOrReference::Object(inline) if inline.is_null())
}

/// Determines each branch's discriminator value: explicit mapping entry,
/// then a single-value enum on the branch's discriminator property, then the
/// bare reference name. Inline branches get no name fallback; with an
/// explicit mapping table present an undeterminable inline branch is a
/// configuration error, without one it is skipped.
fn resolve_discriminator(
  resolver: &mut SchemaResolver<'_>,
  discriminator: &Discriminator,
  branches: &[&ObjectOrReference<ObjectSchema>],
  elements: &[UnionElement],
) -> anyhow::Result<DiscriminatorSpec> {
  let explicit = discriminator.mapping.clone().unwrap_or_default();
  let has_explicit_entries = !explicit.is_empty();

  let mut mapping = BTreeMap::new();

  for (index, branch) in branches.iter().enumerate() {
    let type_name = elements[index].type_name.clone();

    let value = match branch {
      ObjectOrReference::Ref { ref_path, .. } => explicit
        .iter()
        .find(|(_, target)| mapping_targets_ref(target, ref_path))
        .map(|(value, _)| value.clone())
        .or_else(|| enum_discriminator_value(resolver, branch, &discriminator.property_name))
        .or_else(|| component_ref_name(branch)),
      ObjectOrReference::Object(_) => {
        match enum_discriminator_value(resolver, branch, &discriminator.property_name) {
          Some(value) => Some(value),
          None if has_explicit_entries => {
            return Err(ResolveError::AmbiguousDiscriminator { branch_index: index }.into());
          }
          None => None,
        }
      }
    };

    if let Some(value) = value {
      mapping.insert(value, type_name);
    }
  }

  if mapping.len() != branches.len() {
    return Err(
      ResolveError::IncompleteDiscriminatorMapping {
        mapped: mapping.len(),
        total: branches.len(),
      }
      .into(),
    );
  }

  Ok(DiscriminatorSpec {
    property_name: discriminator.property_name.clone(),
    mapping,
  })
}

/// An explicit mapping value may target the full reference path or just the
/// component name.
fn mapping_targets_ref(target: &str, ref_path: &str) -> bool {
  target == ref_path || ref_path.rsplit('/').next() == Some(target)
}

/// Reads a single-value enum from the branch's discriminator property,
/// resolving through references.
fn enum_discriminator_value(
  resolver: &SchemaResolver<'_>,
  branch: &ObjectOrReference<ObjectSchema>,
  property_name: &str,
) -> Option<String> {
  let spec = resolver.spec();
  let schema = match branch {
    ObjectOrReference::Object(inline) => inline.clone(),
    ObjectOrReference::Ref { .. } => branch.resolve(spec).ok()?,
  };

  let property = schema.properties.get(property_name)?;
  let property_schema = match property {
    ObjectOrReference::Object(inline) => inline.clone(),
    ObjectOrReference::Ref { .. } => property.resolve(spec).ok()?,
  };

  match &property_schema.enum_values[..] {
    [value] => value.as_str().map(ToString::to_string),
    _ => property_schema.const_value.as_ref().and_then(|v| v.as_str()).map(ToString::to_string),
  }
}

/// Deduplicates branches that resolved to the same rendered type name,
/// keeping first-seen order and, on a duplicate, whichever variant carries
/// more constraint tokens. Ties keep the first seen.
fn deduplicate(elements: Vec<UnionElement>) -> Vec<UnionElement> {
  let mut deduped: Vec<UnionElement> = vec![];

  for element in elements {
    match deduped.iter_mut().find(|seen| seen.type_name == element.type_name) {
      Some(seen) => {
        if element.schema.constraints.tokens.len() > seen.schema.constraints.tokens.len() {
          *seen = element;
        }
      }
      None => deduped.push(element),
    }
  }

  deduped
}
