use oas3::spec::{ObjectOrReference, ObjectSchema};

use crate::generator::errors::ResolveError;

const COMPONENT_SCHEMA_PREFIX: &str = "#/components/schemas/";

/// Classification of a `$ref` target.
///
/// A *component* reference points directly at a top-level named schema under
/// `#/components/schemas/` and can be short-circuited to a name lookup. A
/// *deep* reference points anywhere else inside the document (for example a
/// schema nested inside an operation) and still requires full structural
/// resolution, after which the result is registered under a name derived from
/// the reference path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RefTarget {
  Component(String),
  Deep(Vec<String>),
}

impl RefTarget {
  /// Classifies a reference path, rejecting paths without the expected
  /// structural depth.
  pub(crate) fn parse(ref_path: &str) -> Result<Self, ResolveError> {
    if let Some(name) = ref_path.strip_prefix(COMPONENT_SCHEMA_PREFIX) {
      if name.is_empty() {
        return Err(ResolveError::MalformedReference(ref_path.to_string()));
      }
      if !name.contains('/') {
        return Ok(Self::Component(name.to_string()));
      }
    }

    let Some(pointer) = ref_path.strip_prefix("#/") else {
      return Err(ResolveError::MalformedReference(ref_path.to_string()));
    };

    let segments: Vec<String> = pointer
      .split('/')
      .filter(|s| !s.is_empty())
      .map(unescape_pointer_segment)
      .collect();

    if segments.len() < 2 {
      return Err(ResolveError::MalformedReference(ref_path.to_string()));
    }

    Ok(Self::Deep(segments))
  }
}

/// Builds a component schema reference path from a name.
pub(crate) fn component_ref_path(name: &str) -> String {
  format!("{COMPONENT_SCHEMA_PREFIX}{name}")
}

/// Extracts the component schema name from an `ObjectOrReference`, if it is a
/// standard component reference.
pub(crate) fn component_ref_name(obj_ref: &ObjectOrReference<ObjectSchema>) -> Option<String> {
  match obj_ref {
    ObjectOrReference::Ref { ref_path, .. } => ref_path
      .strip_prefix(COMPONENT_SCHEMA_PREFIX)
      .filter(|name| !name.is_empty() && !name.contains('/'))
      .map(ToString::to_string),
    ObjectOrReference::Object(_) => None,
  }
}

/// Undoes JSON Pointer escaping (`~1` for `/`, `~0` for `~`).
fn unescape_pointer_segment(segment: &str) -> String {
  segment.replace("~1", "/").replace("~0", "~")
}
