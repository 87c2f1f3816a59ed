use std::collections::BTreeMap;

use serde_json::Value;

use crate::generator::errors::ResolveError;

pub(crate) const X_GO_TYPE: &str = "x-go-type";
pub(crate) const X_GO_TYPE_NAME: &str = "x-go-type-name";
pub(crate) const X_GO_TYPE_SKIP_OPTIONAL_POINTER: &str = "x-go-type-skip-optional-pointer";
pub(crate) const X_GO_NAME: &str = "x-go-name";
pub(crate) const X_GO_NAME_STRICT: &str = "x-go-name-strict";
pub(crate) const X_EXTRA_TAGS: &str = "x-extra-tags";
pub(crate) const X_OMITEMPTY: &str = "x-omitempty";
pub(crate) const X_JSON_IGNORE: &str = "x-json-ignore";
pub(crate) const X_SENSITIVE: &str = "x-sensitive";
pub(crate) const X_ENUM_VARNAMES: &str = "x-enum-varnames";
pub(crate) const X_DEPRECATED_REASON: &str = "x-deprecated-reason";
pub(crate) const X_JSONSCHEMA: &str = "x-jsonschema";

/// Masking strategy for fields marked sensitive.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum MaskStrategy {
  Full,
  Hash,
  Regex { pattern: String },
  Partial { shown: u64 },
}

/// Typed read access to a node's vendor extension bag.
///
/// Each recognized key has one decoder returning present / absent /
/// malformed, so the resolution engine never probes `Value`s ad hoc. A
/// malformed value aborts the run naming the key and the expected shape.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Extensions<'a> {
  map: &'a BTreeMap<String, Value>,
}

impl<'a> Extensions<'a> {
  pub(crate) fn new(map: &'a BTreeMap<String, Value>) -> Self {
    Self { map }
  }

  /// Raw access for `auto_extra_tags` sources; recognized keys should use
  /// their typed decoder instead.
  pub(crate) fn raw(&self, key: &str) -> Option<&'a Value> {
    self.map.get(key)
  }

  fn decode<T>(
    &self,
    key: &'static str,
    expected: &'static str,
    decoder: impl FnOnce(&'a Value) -> Option<T>,
  ) -> Result<Option<T>, ResolveError> {
    match self.map.get(key) {
      None => Ok(None),
      Some(value) => decoder(value)
        .map(Some)
        .ok_or(ResolveError::MalformedExtension { key, expected }),
    }
  }

  fn string(&self, key: &'static str) -> Result<Option<String>, ResolveError> {
    self.decode(key, "a string", |v| v.as_str().map(ToString::to_string))
  }

  fn boolean(&self, key: &'static str) -> Result<Option<bool>, ResolveError> {
    self.decode(key, "a boolean", Value::as_bool)
  }

  /// Force-this-exact-target-type override; bypasses structural inference.
  pub(crate) fn type_override(&self) -> Result<Option<String>, ResolveError> {
    self.string(X_GO_TYPE)
  }

  /// Rename for the whole generated type.
  pub(crate) fn type_name_override(&self) -> Result<Option<String>, ResolveError> {
    self.string(X_GO_TYPE_NAME)
  }

  pub(crate) fn skip_optional_pointer(&self) -> Result<Option<bool>, ResolveError> {
    self.boolean(X_GO_TYPE_SKIP_OPTIONAL_POINTER)
  }

  pub(crate) fn field_rename(&self) -> Result<Option<String>, ResolveError> {
    self.string(X_GO_NAME)
  }

  /// Honor the field rename even when it collides with a sibling.
  pub(crate) fn field_rename_strict(&self) -> Result<Option<bool>, ResolveError> {
    self.boolean(X_GO_NAME_STRICT)
  }

  pub(crate) fn extra_tags(&self) -> Result<Option<BTreeMap<String, String>>, ResolveError> {
    self.decode(X_EXTRA_TAGS, "an object of string values", |v| {
      let object = v.as_object()?;
      object
        .iter()
        .map(|(tag, value)| value.as_str().map(|s| (tag.clone(), s.to_string())))
        .collect()
    })
  }

  pub(crate) fn omit_empty(&self) -> Result<Option<bool>, ResolveError> {
    self.boolean(X_OMITEMPTY)
  }

  pub(crate) fn json_ignore(&self) -> Result<Option<bool>, ResolveError> {
    self.boolean(X_JSON_IGNORE)
  }

  pub(crate) fn sensitive(&self) -> Result<Option<MaskStrategy>, ResolveError> {
    self.decode(
      X_SENSITIVE,
      "an object with a 'strategy' of full|hash|regex|partial",
      |v| {
        let object = v.as_object()?;
        match object.get("strategy")?.as_str()? {
          "full" => Some(MaskStrategy::Full),
          "hash" => Some(MaskStrategy::Hash),
          "regex" => Some(MaskStrategy::Regex {
            pattern: object.get("pattern")?.as_str()?.to_string(),
          }),
          "partial" => Some(MaskStrategy::Partial {
            shown: object.get("shown").and_then(Value::as_u64).unwrap_or(4),
          }),
          _ => None,
        }
      },
    )
  }

  /// Declared-order override names for enum constants.
  pub(crate) fn enum_var_names(&self) -> Result<Option<Vec<String>>, ResolveError> {
    self.decode(X_ENUM_VARNAMES, "an array of strings", |v| {
      v.as_array()?
        .iter()
        .map(|item| item.as_str().map(ToString::to_string))
        .collect()
    })
  }

  pub(crate) fn deprecation_reason(&self) -> Result<Option<String>, ResolveError> {
    self.string(X_DEPRECATED_REASON)
  }

  /// Sibling `jsonschema` output tag value.
  pub(crate) fn jsonschema_tag(&self) -> Result<Option<String>, ResolveError> {
    self.string(X_JSONSCHEMA)
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn bag(entries: &[(&str, Value)]) -> BTreeMap<String, Value> {
    entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
  }

  #[test]
  fn test_absent_keys_decode_to_none() {
    let map = BTreeMap::new();
    let ext = Extensions::new(&map);
    assert_eq!(ext.type_override().unwrap(), None);
    assert_eq!(ext.sensitive().unwrap(), None);
  }

  #[test]
  fn test_type_override_decodes_string() {
    let map = bag(&[(X_GO_TYPE, json!("time.Duration"))]);
    let ext = Extensions::new(&map);
    assert_eq!(ext.type_override().unwrap(), Some("time.Duration".to_string()));
  }

  #[test]
  fn test_malformed_value_is_an_error() {
    let map = bag(&[(X_GO_TYPE, json!(42))]);
    let ext = Extensions::new(&map);
    let error = ext.type_override().unwrap_err();
    assert!(matches!(error, ResolveError::MalformedExtension { key, .. } if key == X_GO_TYPE));
  }

  #[test]
  fn test_sensitive_strategies() {
    let map = bag(&[(X_SENSITIVE, json!({"strategy": "hash"}))]);
    assert_eq!(Extensions::new(&map).sensitive().unwrap(), Some(MaskStrategy::Hash));

    let map = bag(&[(X_SENSITIVE, json!({"strategy": "regex", "pattern": "\\d+"}))]);
    assert_eq!(
      Extensions::new(&map).sensitive().unwrap(),
      Some(MaskStrategy::Regex {
        pattern: "\\d+".to_string()
      })
    );

    let map = bag(&[(X_SENSITIVE, json!({"strategy": "banana"}))]);
    assert!(Extensions::new(&map).sensitive().is_err());
  }

  #[test]
  fn test_extra_tags_decode() {
    let map = bag(&[(X_EXTRA_TAGS, json!({"gorm": "primaryKey", "bson": "_id"}))]);
    let tags = Extensions::new(&map).extra_tags().unwrap().unwrap();
    assert_eq!(tags.get("gorm").map(String::as_str), Some("primaryKey"));
    assert_eq!(tags.get("bson").map(String::as_str), Some("_id"));
  }

  #[test]
  fn test_enum_var_names_decode() {
    let map = bag(&[(X_ENUM_VARNAMES, json!(["First", "Second"]))]);
    let names = Extensions::new(&map).enum_var_names().unwrap().unwrap();
    assert_eq!(names, vec!["First".to_string(), "Second".to_string()]);
  }
}
