use std::collections::BTreeSet;

use anyhow::Context as _;
use itertools::Itertools as _;
use oas3::spec::{ObjectOrReference, ObjectSchema, Schema, SchemaType, SchemaTypeSet, Spec};

use crate::{
  generator::{
    GeneratorConfig,
    ast::{DeclaredLocation, GoType, TypeDefinition},
    constraints::ConstraintResolver,
    errors::ResolveError,
    extensions::Extensions,
    metrics::GenerationStats,
    naming::identifiers::{go_type_name, normalize},
    type_tracker::TypeTracker,
  },
  utils::{RefTarget, SchemaExt, refs::component_ref_path},
};

pub(crate) mod enums;
pub(crate) mod merge;
pub(crate) mod objects;
pub(crate) mod primitives;
pub(crate) mod unions;

#[cfg(test)]
mod tests;

/// Per-node traversal state: the active origin reference (when resolving a
/// named schema), the structural path used to synthesize names for anonymous
/// nested schemas, and the declared-location category for hoisted types.
#[derive(Debug, Clone)]
pub(crate) struct ResolveContext {
  pub(crate) origin_ref: Option<String>,
  pub(crate) path: Vec<String>,
  pub(crate) location: DeclaredLocation,
}

impl ResolveContext {
  pub(crate) fn component(name: &str) -> Self {
    Self {
      origin_ref: Some(component_ref_path(name)),
      path: vec![name.to_string()],
      location: DeclaredLocation::Schema,
    }
  }

  pub(crate) fn rooted(segment: &str, location: DeclaredLocation) -> Self {
    Self {
      origin_ref: None,
      path: vec![segment.to_string()],
      location,
    }
  }

  /// Child context for a nested node; the origin reference never carries
  /// past the node it belongs to.
  pub(crate) fn child(&self, segment: &str) -> Self {
    let mut path = self.path.clone();
    path.push(segment.to_string());
    Self {
      origin_ref: None,
      path,
      location: self.location,
    }
  }

  /// The path-derived type name for this position.
  pub(crate) fn type_name(&self) -> String {
    let joined: String = self.path.iter().map(|segment| normalize(segment)).collect();
    go_type_name(&joined)
  }

  /// Stable identity for the cycle guard: the origin reference when present,
  /// otherwise the structural path.
  fn identity(&self) -> String {
    self
      .origin_ref
      .clone()
      .unwrap_or_else(|| self.path.join("/"))
  }
}

/// Recursive-descent schema resolution: turns `oas3` schema nodes into
/// [`GoType`] descriptors, registering hoisted auxiliary definitions along
/// the way.
///
/// Single-threaded by construction. The tracker is additive for the whole
/// run; the visited set follows stack discipline so sibling subtrees never
/// see each other's marks.
pub(crate) struct SchemaResolver<'a> {
  spec: &'a Spec,
  pub(crate) config: &'a GeneratorConfig,
  pub(crate) tracker: TypeTracker,
  pub(crate) stats: GenerationStats,
  pub(crate) constraints: ConstraintResolver,
  visited: BTreeSet<String>,
}

impl<'a> SchemaResolver<'a> {
  pub(crate) fn new(spec: &'a Spec, config: &'a GeneratorConfig) -> Self {
    Self {
      spec,
      config,
      tracker: TypeTracker::new(),
      stats: GenerationStats::default(),
      constraints: ConstraintResolver::new(config.skip_validation_tags),
      visited: BTreeSet::new(),
    }
  }

  pub(crate) fn spec(&self) -> &'a Spec {
    self.spec
  }

  /// Entry point for an optional schema slot: an absent node degrades to the
  /// fully generic descriptor (malformed array-without-items and similar).
  pub(crate) fn resolve_optional(
    &mut self,
    schema_ref: Option<&ObjectOrReference<ObjectSchema>>,
    ctx: &ResolveContext,
  ) -> anyhow::Result<GoType> {
    match schema_ref {
      None => Ok(GoType::any()),
      Some(obj_ref) => self.resolve_ref(obj_ref, ctx),
    }
  }

  /// Resolves a node that may be a reference or an inline schema.
  pub(crate) fn resolve_ref(
    &mut self,
    obj_ref: &ObjectOrReference<ObjectSchema>,
    ctx: &ResolveContext,
  ) -> anyhow::Result<GoType> {
    match obj_ref {
      ObjectOrReference::Object(schema) => self.resolve_schema(schema, ctx),
      ObjectOrReference::Ref { ref_path, .. } => {
        let target = RefTarget::parse(ref_path).with_context(|| format!("while resolving '{}'", ctx.identity()))?;
        match target {
          // Component references always short-circuit to a name lookup:
          // pass one pre-registered every component's final name, so this
          // also ends recursion for reference cycles.
          RefTarget::Component(name) => {
            let resolved = self
              .tracker
              .lookup_origin(ref_path)
              .map(ToString::to_string)
              .unwrap_or_else(|| go_type_name(&name));
            Ok(GoType::reference(resolved))
          }
          RefTarget::Deep(segments) => self.resolve_deep(ref_path, &segments, ctx),
        }
      }
    }
  }

  /// Resolves an inline schema node through the full decision sequence.
  pub(crate) fn resolve_schema(&mut self, schema: &ObjectSchema, ctx: &ResolveContext) -> anyhow::Result<GoType> {
    let identity = ctx.identity();
    if self.visited.contains(&identity) {
      // Inline recursion without an explicit component reference: answer
      // with a reference to the path-derived name and let the ancestor's
      // hoist materialize the definition.
      let name = ctx.type_name();
      self.tracker.register_name_only(&name);
      return Ok(GoType::reference(name));
    }

    self.with_visited(identity, |resolver| resolver.resolve_schema_inner(schema, ctx))
  }

  /// Visited-set scope: the mark is removed on every exit path, including
  /// error returns, so sibling subtrees never inherit it.
  fn with_visited<T>(
    &mut self,
    identity: String,
    body: impl FnOnce(&mut Self) -> anyhow::Result<T>,
  ) -> anyhow::Result<T> {
    self.visited.insert(identity.clone());
    let result = body(self);
    self.visited.remove(&identity);
    result
  }

  fn resolve_schema_inner(&mut self, schema: &ObjectSchema, ctx: &ResolveContext) -> anyhow::Result<GoType> {
    let merged;
    let schema = if schema.all_of.is_empty() {
      schema
    } else {
      if let Some(shortcut) = self.all_of_shortcut(schema)? {
        return Ok(shortcut);
      }
      merged = merge::merge_all_of(self.spec, schema)
        .with_context(|| format!("while merging allOf branches of '{}'", ctx.identity()))?;
      &merged
    };

    let ext = Extensions::new(&schema.extensions);
    if let Some(override_type) = ext.type_override()? {
      let mut out = GoType::primitive(override_type);
      out.skip_optional_pointer = ext.skip_optional_pointer()?.unwrap_or(false);
      return Ok(out);
    }

    let kind = schema.single_type().or_else(|| schema.non_null_type());
    if matches!(kind, Some(SchemaType::Object)) || (kind.is_none() && schema.has_object_structure()) {
      objects::resolve_object(self, schema, ctx)
    } else if !schema.enum_values.is_empty() {
      enums::resolve_enum(self, schema, kind, ctx)
    } else if let Some(kind) = kind {
      primitives::resolve_primitive(self, schema, kind, ctx)
    } else if let Some(SchemaTypeSet::Multiple(types)) = &schema.schema_type {
      // A multi-type set beyond a nullable pair has no single Go mapping.
      let rendered = types.iter().map(|t| format!("{t:?}").to_lowercase()).join("|");
      Err(ResolveError::UnhandledKind(rendered).into())
    } else {
      // No kind, no structure, no enum values: nothing to infer from.
      Ok(GoType::any())
    }
  }

  /// When `allOf` is a single component reference plus annotation-only
  /// companions, the composition is fully determined by the reference.
  fn all_of_shortcut(&mut self, schema: &ObjectSchema) -> anyhow::Result<Option<GoType>> {
    if schema.has_union() || !schema.properties.is_empty() || schema.additional_properties.is_some() {
      return Ok(None);
    }

    let mut reference = None;
    for branch in &schema.all_of {
      match branch {
        ObjectOrReference::Ref { .. } if reference.is_none() => reference = Some(branch),
        ObjectOrReference::Ref { .. } => return Ok(None),
        ObjectOrReference::Object(inline) if inline.is_annotation_only() => {}
        ObjectOrReference::Object(_) => return Ok(None),
      }
    }

    match reference {
      Some(branch) => {
        let ctx = ResolveContext {
          origin_ref: None,
          path: vec![],
          location: DeclaredLocation::Schema,
        };
        Ok(Some(self.resolve_ref(branch, &ctx)?))
      }
      None => Ok(None),
    }
  }

  /// Deep-path references resolve structurally, then the result is
  /// registered under a path-derived name so repeated uses of the same path
  /// converge on one definition.
  fn resolve_deep(&mut self, ref_path: &str, segments: &[String], ctx: &ResolveContext) -> anyhow::Result<GoType> {
    if let Some(name) = self.tracker.lookup_origin(ref_path) {
      return Ok(GoType::reference(name.to_string()));
    }
    if self.visited.contains(ref_path) {
      let name = deep_path_name(segments);
      self.tracker.register_name_only(&name);
      self.tracker.assign_origin(ref_path, &name);
      return Ok(GoType::reference(name));
    }

    let spec = self.spec;
    let target =
      navigate_deep_path(spec, segments).ok_or_else(|| ResolveError::MalformedReference(ref_path.to_string()))?;

    let deep_ctx = ResolveContext {
      origin_ref: Some(ref_path.to_string()),
      path: vec![deep_path_name(segments)],
      location: ctx.location,
    };
    let descriptor = self
      .resolve_schema(target, &deep_ctx)
      .with_context(|| format!("while resolving deep reference '{ref_path}'"))?;

    if descriptor.needs_named_definition() {
      // A recursive re-entry below may have already reserved this path's
      // name; reuse it so the inner reference stays valid.
      match self.tracker.lookup_origin(ref_path).map(ToString::to_string) {
        Some(reserved) => Ok(promote(descriptor, reserved, ctx.location, Some(ref_path))),
        None => Ok(self.hoist(descriptor, &deep_path_name(segments), &[], ctx.location, Some(ref_path))),
      }
    } else {
      Ok(descriptor)
    }
  }

  /// Promotes a descriptor to a named definition, returning a reference
  /// descriptor that carries the new definition (and any it accumulated) in
  /// `additional_defs` for registration by the caller.
  pub(crate) fn hoist(
    &mut self,
    descriptor: GoType,
    base: &str,
    preferred_suffixes: &[&str],
    location: DeclaredLocation,
    origin_ref: Option<&str>,
  ) -> GoType {
    let name = self.tracker.generate_unique_name(base, preferred_suffixes);
    self.tracker.register_name_only(&name);
    if let Some(origin) = origin_ref {
      self.tracker.assign_origin(origin, &name);
    }
    promote(descriptor, name, location, origin_ref)
  }
}

/// Builds the definition/reference pair for a descriptor promoted under an
/// already-reserved name.
fn promote(mut descriptor: GoType, name: String, location: DeclaredLocation, origin_ref: Option<&str>) -> GoType {
  let aux = descriptor.take_additional_defs();

  let mut def = TypeDefinition::new(&name, descriptor, location);
  if let Some(origin) = origin_ref {
    def = def.with_origin(origin);
  }

  let mut reference = GoType::reference(name);
  reference.additional_defs = aux;
  reference.additional_defs.push(def);
  reference
}

/// Synthesizes a type name from the meaningful segments of a deep reference
/// path, dropping structural keywords.
fn deep_path_name(segments: &[String]) -> String {
  const STRUCTURAL: &[&str] = &[
    "components",
    "schemas",
    "properties",
    "items",
    "additionalProperties",
    "oneOf",
    "anyOf",
    "allOf",
    "paths",
    "content",
    "schema",
  ];
  let joined: String = segments
    .iter()
    .filter(|segment| !STRUCTURAL.contains(&segment.as_str()))
    .map(|segment| normalize(segment))
    .collect();
  go_type_name(&joined)
}

/// Walks a deep JSON-pointer path rooted at `#/components/schemas/` down to
/// the referenced schema node. Other roots are not materialized in the typed
/// document model and classify as malformed.
fn navigate_deep_path<'s>(spec: &'s Spec, segments: &[String]) -> Option<&'s ObjectSchema> {
  let ["components", "schemas", root, rest @ ..] = &segments
    .iter()
    .map(String::as_str)
    .collect::<Vec<_>>()[..]
  else {
    return None;
  };

  let components = spec.components.as_ref()?;
  let mut current = match components.schemas.get(*root)? {
    ObjectOrReference::Object(schema) => schema,
    ObjectOrReference::Ref { .. } => return None,
  };

  let mut steps = rest.iter();
  while let Some(step) = steps.next() {
    current = match *step {
      "properties" => {
        let property = steps.next()?;
        match current.properties.get(*property)? {
          ObjectOrReference::Object(schema) => schema,
          ObjectOrReference::Ref { .. } => return None,
        }
      }
      "items" => match current.items.as_deref()? {
        Schema::Object(obj_ref) => match obj_ref.as_ref() {
          ObjectOrReference::Object(schema) => schema,
          ObjectOrReference::Ref { .. } => return None,
        },
        Schema::Boolean(_) => return None,
      },
      "additionalProperties" => match current.additional_properties.as_ref()? {
        Schema::Object(obj_ref) => match obj_ref.as_ref() {
          ObjectOrReference::Object(schema) => schema,
          ObjectOrReference::Ref { .. } => return None,
        },
        Schema::Boolean(_) => return None,
      },
      "oneOf" | "anyOf" | "allOf" => {
        let index: usize = steps.next()?.parse().ok()?;
        let branches = match *step {
          "oneOf" => &current.one_of,
          "anyOf" => &current.any_of,
          _ => &current.all_of,
        };
        match branches.get(index)? {
          ObjectOrReference::Object(schema) => schema,
          ObjectOrReference::Ref { .. } => return None,
        }
      }
      _ => return None,
    };
  }

  Some(current)
}
