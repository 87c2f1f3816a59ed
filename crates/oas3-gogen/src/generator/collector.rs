use std::collections::BTreeMap;

use anyhow::Context as _;
use http::Method;
use itertools::Itertools as _;
use oas3::spec::{MediaType, ObjectOrReference, ObjectSchema, Operation, Parameter, PathItem, Spec};

use crate::{
  generator::{
    GeneratorConfig,
    ast::{DeclaredLocation, GeneratedOutput, GoType, OperationDefinition, Property, TypeDefinition},
    constraints::{Constraints, FieldContext},
    dependency_graph::DependencyGraph,
    extensions::{Extensions, X_GO_TYPE_NAME},
    metrics::{GenerationStats, GenerationWarning},
    naming::identifiers::{go_type_name, normalize},
    resolver::{ResolveContext, SchemaResolver},
  },
  utils::{doc_lines, refs::component_ref_path},
};

/// Drives the whole run: two-pass component collection, the endpoint walk,
/// and the final grouping of registered definitions by declared location.
pub(crate) struct Collector<'a> {
  spec: &'a Spec,
  config: &'a GeneratorConfig,
  resolver: SchemaResolver<'a>,
}

impl<'a> Collector<'a> {
  pub(crate) fn new(spec: &'a Spec, config: &'a GeneratorConfig) -> Self {
    Self {
      spec,
      config,
      resolver: SchemaResolver::new(spec, config),
    }
  }

  pub(crate) fn collect(mut self) -> anyhow::Result<(GeneratedOutput, GenerationStats)> {
    let components = self
      .spec
      .components
      .as_ref()
      .map(|c| &c.schemas)
      .cloned()
      .unwrap_or_default();

    // Pass one: every component gets its final name up front, so forward
    // references always resolve to final names in pass two.
    self.preregister_components(&components)?;

    let graph = DependencyGraph::build(&self.inline_component_schemas(&components));
    self.resolver.stats.record_cycles(graph.detect_cycles());

    self.resolve_components(&components, &graph)?;
    let operations = self.collect_operations()?;

    let error_types = self.resolver.tracker.error_type_names();
    let mut output = GeneratedOutput {
      operations,
      error_types,
      ..GeneratedOutput::default()
    };
    for def in self.resolver.tracker.into_definitions() {
      match def.location {
        DeclaredLocation::Schema => output.schema_types.push(def),
        DeclaredLocation::Body => output.body_types.push(def),
        DeclaredLocation::Response => output.response_types.push(def),
        DeclaredLocation::Parameter => output.parameter_types.push(def),
        DeclaredLocation::Union => output.union_types.push(def),
      }
    }

    Ok((output, self.resolver.stats))
  }

  fn preregister_components(
    &mut self,
    components: &BTreeMap<String, ObjectOrReference<ObjectSchema>>,
  ) -> anyhow::Result<()> {
    for (name, schema_ref) in components {
      let preferred = match schema_ref {
        ObjectOrReference::Object(schema) => Extensions::new(&schema.extensions)
          .type_name_override()
          .with_context(|| format!("while pre-registering component '{name}'"))?
          .map(|n| go_type_name(&n)),
        ObjectOrReference::Ref { .. } => None,
      };
      let base = preferred.unwrap_or_else(|| go_type_name(name));
      let unique = self.resolver.tracker.generate_unique_name(&base, &[]);
      self.resolver.tracker.register_name_only(&unique);
      self.resolver.tracker.assign_origin(&component_ref_path(name), &unique);
    }
    Ok(())
  }

  /// Inline view of the component map for the dependency pre-scan;
  /// alias components resolve through the document.
  fn inline_component_schemas(
    &self,
    components: &BTreeMap<String, ObjectOrReference<ObjectSchema>>,
  ) -> BTreeMap<String, ObjectSchema> {
    components
      .iter()
      .filter_map(|(name, schema_ref)| match schema_ref {
        ObjectOrReference::Object(schema) => Some((name.clone(), schema.clone())),
        ObjectOrReference::Ref { .. } => schema_ref.resolve(self.spec).ok().map(|schema| (name.clone(), schema)),
      })
      .collect()
  }

  fn resolve_components(
    &mut self,
    components: &BTreeMap<String, ObjectOrReference<ObjectSchema>>,
    graph: &DependencyGraph,
  ) -> anyhow::Result<()> {
    for (name, schema_ref) in components {
      let final_name = self
        .resolver
        .tracker
        .lookup_origin(&component_ref_path(name))
        .map(ToString::to_string)
        .ok_or_else(|| anyhow::anyhow!("component '{name}' was never pre-registered"))?;

      let mut descriptor = match schema_ref {
        // A component that is literally a reference becomes an alias.
        ObjectOrReference::Ref { .. } => {
          let mut alias = self
            .resolver
            .resolve_ref(schema_ref, &ResolveContext::component(name))
            .with_context(|| format!("while resolving component '{name}'"))?;
          alias.define_via_alias = true;
          alias
        }
        ObjectOrReference::Object(schema) => {
          // The rename extension was consumed during pre-registration.
          let mut body = schema.clone();
          body.extensions.remove(X_GO_TYPE_NAME);
          self
            .resolver
            .resolve_schema(&body, &ResolveContext::component(name))
            .with_context(|| format!("while resolving component '{name}'"))?
        }
      };

      for aux in descriptor.take_additional_defs() {
        self.register_def(aux);
      }

      if let ObjectOrReference::Object(schema) = schema_ref
        && !self.config.omit_descriptions
        && descriptor.docs.is_empty()
        && let Some(ref description) = schema.description
      {
        descriptor.docs = doc_lines(description);
      }

      let mut def =
        TypeDefinition::new(&final_name, descriptor, DeclaredLocation::Schema).with_origin(component_ref_path(name));
      // Self-referential types marshal through an indirection to break the
      // value cycle.
      def.needs_marshaler |= graph.is_cyclic(name);
      self.register_def(def);
    }
    Ok(())
  }

  fn register_def(&mut self, def: TypeDefinition) {
    self.resolver.stats.record_type(&def);
    self.resolver.tracker.register(def);
  }

  fn collect_operations(&mut self) -> anyhow::Result<Vec<OperationDefinition>> {
    let mut operations = vec![];
    let Some(ref paths) = self.spec.paths else {
      return Ok(operations);
    };

    for (path, path_item) in paths {
      let methods: Vec<(Method, &Operation)> = path_item
        .methods()
        .into_iter()
        .sorted_by_key(|(method, _)| method.to_string())
        .collect();
      for (method, operation) in methods {
        let converted = self
          .collect_operation(path, path_item, method.as_str(), operation)
          .with_context(|| format!("while converting operation {method} {path}"))?;
        self.resolver.stats.record_operation();
        operations.push(converted);
      }
    }

    Ok(operations)
  }

  fn collect_operation(
    &mut self,
    path: &str,
    path_item: &PathItem,
    method: &str,
    operation: &Operation,
  ) -> anyhow::Result<OperationDefinition> {
    let operation_id = match operation.operation_id {
      Some(ref id) => id.clone(),
      None => {
        let derived = go_type_name(&format!("{} {}", method.to_lowercase(), path));
        self.resolver.stats.record_warning(GenerationWarning::MissingOperationId {
          method: method.to_string(),
          path: path.to_string(),
          derived: derived.clone(),
        });
        derived
      }
    };
    let op_name = go_type_name(&operation_id);

    let params = self.combined_parameters(path_item, operation)?;
    let params_type = self.build_params_type(&op_name, method, path, &params)?;
    let request_body_type = self.build_request_body_type(&op_name, operation)?;
    let responses = self.build_response_types(&op_name, &operation_id, operation)?;

    let mut docs = vec![];
    if !self.config.omit_descriptions {
      if let Some(ref summary) = operation.summary {
        docs.extend(doc_lines(summary));
      }
      if let Some(ref description) = operation.description {
        docs.extend(doc_lines(description));
      }
    }

    Ok(OperationDefinition {
      operation_id,
      method: method.to_string(),
      path: path.to_string(),
      params_type,
      request_body_type,
      responses,
      deprecated: operation.deprecated.unwrap_or(false),
      docs,
    })
  }

  /// Path-level parameters first, then operation-level ones, which replace
  /// any path-level parameter with the same name and location.
  fn combined_parameters(&mut self, path_item: &PathItem, operation: &Operation) -> anyhow::Result<Vec<Parameter>> {
    let mut params: Vec<Parameter> = vec![];

    for param_ref in path_item.parameters.iter().chain(&operation.parameters) {
      let param = param_ref
        .resolve(self.spec)
        .map_err(|e| anyhow::anyhow!("unresolvable parameter reference: {e}"))?;
      params.retain(|p| p.location != param.location || p.name != param.name);
      params.push(param);
    }

    Ok(params)
  }

  fn build_params_type(
    &mut self,
    op_name: &str,
    method: &str,
    path: &str,
    params: &[Parameter],
  ) -> anyhow::Result<Option<String>> {
    if params.is_empty() {
      return Ok(None);
    }

    let mut properties = vec![];
    for param in params {
      properties.push(self.build_param_property(op_name, method, path, param)?);
    }

    let mut bundle = GoType {
      properties,
      ..GoType::default()
    };
    bundle.render_struct_literal(self.config.skip_validation_tags);

    let name = self.resolver.tracker.generate_unique_name(&format!("{op_name}Params"), &[]);
    self.register_def(TypeDefinition::new(&name, bundle, DeclaredLocation::Parameter));
    Ok(Some(name))
  }

  fn build_param_property(
    &mut self,
    op_name: &str,
    method: &str,
    path: &str,
    param: &Parameter,
  ) -> anyhow::Result<Property> {
    use oas3::spec::ParameterIn;

    let required = matches!(param.location, ParameterIn::Path) || param.required.unwrap_or(false);

    let (mut descriptor, constraints) = match param.schema {
      Some(ref schema_ref) => {
        let ctx = ResolveContext {
          origin_ref: None,
          path: vec![op_name.to_string(), go_type_name(&param.name)],
          location: DeclaredLocation::Parameter,
        };
        let descriptor = self.resolver.resolve_ref(schema_ref, &ctx)?;
        let facets = match schema_ref {
          ObjectOrReference::Object(inline) => inline.clone(),
          ObjectOrReference::Ref { .. } => schema_ref.resolve(self.spec).unwrap_or_default(),
        };
        let constraints = self.resolver.constraints.resolve(
          &facets,
          FieldContext {
            required_in_parent: required,
            has_explicit_null: false,
          },
        );
        (descriptor, constraints)
      }
      None => {
        self
          .resolver
          .stats
          .record_warning(GenerationWarning::ParameterWithoutSchema {
            name: param.name.clone(),
            method: method.to_string(),
            path: path.to_string(),
          });
        let mut constraints = Constraints {
          required,
          nullable: !required,
          ..Default::default()
        };
        if required {
          constraints.tokens.push("required".to_string());
        }
        (GoType::primitive("string"), constraints)
      }
    };

    for aux in descriptor.take_additional_defs() {
      self.register_def(aux);
    }

    let ext = Extensions::new(&param.extensions);
    let go_name = ext.field_rename()?.unwrap_or_else(|| go_type_name(&param.name));

    Ok(Property {
      go_name,
      json_name: param.name.clone(),
      schema: descriptor,
      constraints,
      extra_tags: BTreeMap::new(),
      json_ignore: false,
      omit_empty_override: None,
      sensitive: None,
      deprecated: false,
      deprecation_reason: None,
      docs: vec![],
    })
  }

  fn build_request_body_type(&mut self, op_name: &str, operation: &Operation) -> anyhow::Result<Option<String>> {
    let Some(ref body_ref) = operation.request_body else {
      return Ok(None);
    };
    let body = body_ref
      .resolve(self.spec)
      .map_err(|e| anyhow::anyhow!("unresolvable request body reference: {e}"))?;

    let Some(media_type) = preferred_media_type(&body.content) else {
      return Ok(None);
    };
    let Some(ref schema_ref) = media_type.schema else {
      return Ok(None);
    };

    let ctx = ResolveContext::rooted(&format!("{op_name}Body"), DeclaredLocation::Body);
    let name = self.resolve_into_named(schema_ref, &ctx, &format!("{op_name}Body"))?;
    Ok(Some(name))
  }

  fn build_response_types(
    &mut self,
    op_name: &str,
    operation_id: &str,
    operation: &Operation,
  ) -> anyhow::Result<BTreeMap<String, String>> {
    let mut responses = BTreeMap::new();
    let Some(ref declared) = operation.responses else {
      return Ok(responses);
    };

    for (status, response_ref) in declared {
      let response = response_ref
        .resolve(self.spec)
        .map_err(|e| anyhow::anyhow!("unresolvable response reference for status {status}: {e}"))?;

      let Some(media_type) = preferred_media_type(&response.content) else {
        self
          .resolver
          .stats
          .record_warning(GenerationWarning::ResponseWithoutContent {
            status: status.clone(),
            operation_id: operation_id.to_string(),
          });
        continue;
      };
      let Some(ref schema_ref) = media_type.schema else {
        continue;
      };

      // The status lands mid-identifier, so a leading digit needs no
      // prefixing.
      let base = format!("{op_name}Response{}", normalize(status));
      let ctx = ResolveContext::rooted(&base, DeclaredLocation::Response);
      let name = self.resolve_into_named(schema_ref, &ctx, &base)?;

      if is_error_status(status) {
        self.resolver.tracker.mark_needs_error_impl(&name);
      }
      responses.insert(status.clone(), name);
    }

    Ok(responses)
  }

  /// Resolves a schema slot into a named type: references reuse their
  /// target's name, anything else is registered under `base`.
  fn resolve_into_named(
    &mut self,
    schema_ref: &ObjectOrReference<ObjectSchema>,
    ctx: &ResolveContext,
    base: &str,
  ) -> anyhow::Result<String> {
    let mut descriptor = self.resolver.resolve_ref(schema_ref, ctx)?;
    for aux in descriptor.take_additional_defs() {
      self.register_def(aux);
    }

    if let Some(name) = descriptor.named_ref {
      return Ok(name);
    }

    let name = self.resolver.tracker.generate_unique_name(base, &[]);
    self.register_def(TypeDefinition::new(&name, descriptor, ctx.location));
    Ok(name)
  }
}

/// Prefers JSON content, falling back to the first declared media type.
fn preferred_media_type(content: &BTreeMap<String, MediaType>) -> Option<&MediaType> {
  content
    .get("application/json")
    .or_else(|| {
      content
        .iter()
        .find(|(key, _)| key.contains("json"))
        .map(|(_, media)| media)
    })
    .or_else(|| content.values().next())
}

fn is_error_status(status: &str) -> bool {
  status == "default" || status.starts_with('4') || status.starts_with('5')
}
