use std::{collections::BTreeMap, fmt::Write as _};

use crate::generator::{constraints::Constraints, extensions::MaskStrategy};

/// Go's unconstrained top type. Methods cannot be attached to it, and the
/// type tracker refuses to mark it for error-interface generation.
pub const GO_ANY: &str = "any";

/// Where a generated type definition was declared, used to group the final
/// output for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
pub enum DeclaredLocation {
  Schema,
  Body,
  Response,
  Parameter,
  Union,
}

/// One constant of a generated enum type.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct EnumEntry {
  pub go_name: String,
  pub value: serde_json::Value,
}

/// A single union variant: the rendered type name paired with the full
/// constraint-bearing descriptor, which deduplication needs for its
/// strictness comparison.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct UnionElement {
  pub type_name: String,
  pub schema: GoType,
}

/// Discriminator dispatch data: the payload property consulted at decode
/// time and the value-to-type mapping.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DiscriminatorSpec {
  pub property_name: String,
  pub mapping: BTreeMap<String, String>,
}

/// A field on a struct-shaped descriptor.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Property {
  pub go_name: String,
  pub json_name: String,
  pub schema: GoType,
  pub constraints: Constraints,
  pub extra_tags: BTreeMap<String, String>,
  pub json_ignore: bool,
  pub omit_empty_override: Option<bool>,
  pub sensitive: Option<MaskStrategy>,
  pub deprecated: bool,
  pub deprecation_reason: Option<String>,
  pub docs: Vec<String>,
}

impl Property {
  /// Whether the JSON tag carries `omitempty`. The override extension wins;
  /// otherwise optional nullable fields omit their zero value.
  fn omit_empty(&self) -> bool {
    self
      .omit_empty_override
      .unwrap_or(self.constraints.nullable && !self.constraints.required)
  }

  /// Whether the field is rendered behind a pointer. Slices, maps, and the
  /// unconstrained type are already nillable in Go.
  pub fn uses_pointer(&self) -> bool {
    if self.schema.skip_optional_pointer || self.constraints.required || !self.constraints.nullable {
      return false;
    }
    let decl = self.schema.type_decl();
    !(decl.starts_with("[]") || decl.starts_with("map[") || decl == GO_ANY || decl.is_empty())
  }

  fn render_tags(&self, skip_validation_tags: bool) -> String {
    let mut tags = vec![];

    if self.json_ignore {
      tags.push("json:\"-\"".to_string());
    } else {
      let mut json_tag = self.json_name.clone();
      if self.omit_empty() {
        json_tag.push_str(",omitempty");
      }
      tags.push(format!("json:\"{json_tag}\""));
    }

    if !skip_validation_tags && !self.constraints.tokens.is_empty() {
      tags.push(format!("validate:\"{}\"", self.constraints.tokens.join(",")));
    }

    for (tag, value) in &self.extra_tags {
      tags.push(format!("{tag}:\"{value}\""));
    }

    tags.join(" ")
  }
}

/// Resolved type descriptor: the central output value of schema resolution.
///
/// A descriptor is either a *reference* (`named_ref` set, no structure of its
/// own) or a *definition* (properties, union elements, or a rendered
/// primitive type). `type_decl` resolves references before falling back to
/// the rendered primitive name.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct GoType {
  /// Rendered Go type expression: `string`, `[]Pet`, `map[string]Order`, or
  /// a struct literal.
  pub type_name: String,
  /// Set iff this descriptor merely points at another named type.
  pub named_ref: Option<String>,
  /// Declare as `type X = Y` instead of a distinct nominal type.
  pub define_via_alias: bool,
  pub array_element: Option<Box<GoType>>,
  pub map_value: Option<Box<GoType>>,
  pub properties: Vec<Property>,
  pub union_elements: Vec<UnionElement>,
  pub discriminator: Option<DiscriminatorSpec>,
  /// Auxiliary named types this node's construction spawned, owned here
  /// until hoisted into the global type list.
  pub additional_defs: Vec<TypeDefinition>,
  pub constraints: Constraints,
  pub enum_entries: Vec<EnumEntry>,
  pub has_additional_properties: bool,
  pub is_primitive_alias: bool,
  pub skip_optional_pointer: bool,
  pub docs: Vec<String>,
}

impl GoType {
  /// A descriptor for a rendered primitive type, declared via alias.
  pub fn primitive(type_name: impl Into<String>) -> Self {
    Self {
      type_name: type_name.into(),
      define_via_alias: true,
      is_primitive_alias: true,
      ..Self::default()
    }
  }

  /// A reference-only descriptor pointing at a named type.
  pub fn reference(name: impl Into<String>) -> Self {
    Self {
      named_ref: Some(name.into()),
      ..Self::default()
    }
  }

  /// The fully generic fallback descriptor.
  pub fn any() -> Self {
    Self::primitive(GO_ANY)
  }

  /// The no-op descriptor for a `null`-only schema; it has no representable
  /// content.
  pub fn empty() -> Self {
    Self::default()
  }

  /// Display form: the reference name when present, else the rendered type.
  pub fn type_decl(&self) -> &str {
    self.named_ref.as_deref().unwrap_or(&self.type_name)
  }

  /// Whether this descriptor is a pure reference to another named type.
  pub fn is_reference(&self) -> bool {
    self.named_ref.is_some()
  }

  /// Structural complexity drives hoisting decisions: a complex inline
  /// descriptor is promoted to its own named type instead of being inlined.
  pub fn is_structurally_complex(&self) -> bool {
    !self.properties.is_empty() || self.map_value.is_some() || !self.union_elements.is_empty()
  }

  /// Whether a deep-path resolved descriptor must be registered as a named
  /// definition: it has properties, additional properties, union elements,
  /// or is a deliberately named alias.
  pub fn needs_named_definition(&self) -> bool {
    !self.properties.is_empty()
      || self.has_additional_properties
      || !self.union_elements.is_empty()
      || (self.define_via_alias && !self.is_primitive_alias)
  }

  /// Moves the accumulated auxiliary definitions out of this descriptor.
  pub fn take_additional_defs(&mut self) -> Vec<TypeDefinition> {
    std::mem::take(&mut self.additional_defs)
  }

  /// Renders the struct literal for an object-shaped descriptor from its
  /// assembled field list, including the additional-properties carrier and
  /// union storage fields when applicable.
  pub fn render_struct_literal(&mut self, skip_validation_tags: bool) {
    let mut out = String::from("struct {\n");

    for property in &self.properties {
      let pointer = if property.uses_pointer() { "*" } else { "" };
      let tags = property.render_tags(skip_validation_tags);
      let _ = writeln!(
        out,
        "\t{} {}{} `{}`",
        property.go_name,
        pointer,
        property.schema.type_decl(),
        tags
      );
    }

    if let Some(ref value_type) = self.map_value {
      let _ = writeln!(
        out,
        "\tAdditionalProperties map[string]{} `json:\"-\"`",
        value_type.type_decl()
      );
    }

    if !self.union_elements.is_empty() {
      out.push_str("\tunion json.RawMessage\n");
    }

    out.push('}');
    self.type_name = out;
  }
}

/// A named, top-level type definition. Created once per unique named schema
/// encountered during traversal and never mutated after construction.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TypeDefinition {
  pub name: String,
  pub origin_ref: Option<String>,
  pub schema: GoType,
  pub location: DeclaredLocation,
  pub needs_marshaler: bool,
  pub has_sensitive_data: bool,
}

impl TypeDefinition {
  pub fn new(name: impl Into<String>, schema: GoType, location: DeclaredLocation) -> Self {
    let has_sensitive_data = schema.properties.iter().any(|p| p.sensitive.is_some());
    // Unions decode through raw-payload storage and always need custom
    // marshal logic; everything else gets it only when flagged later.
    let needs_marshaler = !schema.union_elements.is_empty() || schema.map_value.is_some();
    Self {
      name: name.into(),
      origin_ref: None,
      schema,
      location,
      needs_marshaler,
      has_sensitive_data,
    }
  }

  pub fn with_origin(mut self, origin_ref: impl Into<String>) -> Self {
    self.origin_ref = Some(origin_ref.into());
    self
  }
}

/// A single resolved endpoint.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct OperationDefinition {
  pub operation_id: String,
  pub method: String,
  pub path: String,
  pub params_type: Option<String>,
  pub request_body_type: Option<String>,
  /// Status code (or `default`) to response type name.
  pub responses: BTreeMap<String, String>,
  pub deprecated: bool,
  pub docs: Vec<String>,
}

/// Final grouped output handed to the external renderer.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct GeneratedOutput {
  pub schema_types: Vec<TypeDefinition>,
  pub body_types: Vec<TypeDefinition>,
  pub response_types: Vec<TypeDefinition>,
  pub parameter_types: Vec<TypeDefinition>,
  pub union_types: Vec<TypeDefinition>,
  pub operations: Vec<OperationDefinition>,
  /// Names of types that must receive error-interface behavior.
  pub error_types: Vec<String>,
}

impl GeneratedOutput {
  pub fn all_types(&self) -> impl Iterator<Item = &TypeDefinition> {
    self
      .schema_types
      .iter()
      .chain(&self.body_types)
      .chain(&self.response_types)
      .chain(&self.parameter_types)
      .chain(&self.union_types)
  }
}
