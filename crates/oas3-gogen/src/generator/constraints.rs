use oas3::spec::{ObjectSchema, SchemaType};

use crate::utils::SchemaExt;

/// Canonical presence and validation data for a resolved field.
///
/// `required`/`nullable` drive wire-format presence (pointer wrapping,
/// `omitempty`); `tokens` is the deterministically ordered validation-rule
/// list consumed by the renderer's tag emission.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Constraints {
  pub required: bool,
  pub nullable: bool,
  pub tokens: Vec<String>,
}

/// Required-ness context supplied by the *parent* schema.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FieldContext {
  /// The parent object lists this field in its `required` array.
  pub required_in_parent: bool,
  /// The field's type set explicitly includes `null`.
  pub has_explicit_null: bool,
}

/// Computes [`Constraints`] from a schema's raw validation facets and the
/// parent's required-ness context.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ConstraintResolver {
  skip_validation_tokens: bool,
}

impl ConstraintResolver {
  pub(crate) fn new(skip_validation_tokens: bool) -> Self {
    Self { skip_validation_tokens }
  }

  /// Applies the presence rules in order (later rules override earlier
  /// ones), then emits the ordered token list.
  pub(crate) fn resolve(&self, schema: &ObjectSchema, ctx: FieldContext) -> Constraints {
    let has_explicit_null = ctx.has_explicit_null || schema.declares_null();
    let kind = schema.single_type().or_else(|| schema.non_null_type());

    let mut required = ctx.required_in_parent;

    // Read-only fields never legally appear in request payloads; write-only
    // fields never appear in responses. A struct-level "required" on either
    // would reject valid bodies.
    if required && schema.read_only.unwrap_or(false) {
      required = false;
    }
    if required && schema.write_only.unwrap_or(false) {
      required = false;
    }

    let mut nullable = !required || has_explicit_null;

    // A required boolean whose zero value is `false` is indistinguishable
    // from an absent one, so it is treated as optional-with-default.
    if required && kind == Some(SchemaType::Boolean) {
      required = false;
      nullable = has_explicit_null;
    }

    // A required string capped at length zero can only ever hold "".
    // Almost always a spec authoring mistake, but it must not fail the run.
    if required && kind == Some(SchemaType::String) && schema.max_length == Some(0) {
      required = false;
    }

    // Object-shaped fields are validated by recursing into their own
    // validation method, never through a scalar "required" tag.
    let is_object_shaped = kind == Some(SchemaType::Object) || (kind.is_none() && !schema.properties.is_empty());
    if required && is_object_shaped {
      required = false;
      if has_explicit_null {
        nullable = true;
      }
    }

    let tokens = if self.skip_validation_tokens {
      vec![]
    } else {
      build_tokens(schema, kind, required, nullable)
    };

    Constraints {
      required,
      nullable,
      tokens,
    }
  }
}

/// Emits the ordered token list: `required`/`omitempty` first, remaining
/// facet tokens sorted lexicographically. A lone `omitempty` is suppressed.
fn build_tokens(schema: &ObjectSchema, kind: Option<SchemaType>, required: bool, nullable: bool) -> Vec<String> {
  let mut facet_tokens = vec![];

  match kind {
    Some(SchemaType::String) => {
      if let Some(min) = schema.min_length {
        facet_tokens.push(format!("min={min}"));
      }
      if let Some(max) = schema.max_length {
        facet_tokens.push(format!("max={max}"));
      }
    }
    Some(SchemaType::Array) => {
      if let Some(min) = schema.min_items {
        facet_tokens.push(format!("min={min}"));
      }
      if let Some(max) = schema.max_items {
        facet_tokens.push(format!("max={max}"));
      }
    }
    Some(SchemaType::Integer | SchemaType::Number) => {
      // The model carries exclusive bounds only in numeric form, which
      // takes precedence over inclusive bounds anyway.
      if let Some(ref bound) = schema.exclusive_minimum {
        facet_tokens.push(format!("gt={bound}"));
      } else if let Some(ref bound) = schema.minimum {
        facet_tokens.push(format!("gte={bound}"));
      }
      if let Some(ref bound) = schema.exclusive_maximum {
        facet_tokens.push(format!("lt={bound}"));
      } else if let Some(ref bound) = schema.maximum {
        facet_tokens.push(format!("lte={bound}"));
      }
    }
    _ => {}
  }

  facet_tokens.sort();

  let mut tokens = vec![];
  if required {
    tokens.push("required".to_string());
  } else if nullable {
    tokens.push("omitempty".to_string());
  }
  tokens.extend(facet_tokens);

  if tokens.len() == 1 && tokens[0] == "omitempty" {
    return vec![];
  }

  tokens
}
