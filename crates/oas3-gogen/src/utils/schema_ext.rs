use oas3::spec::{ObjectSchema, Schema, SchemaType, SchemaTypeSet};

/// Extension methods for `ObjectSchema` to query its shape conveniently.
pub(crate) trait SchemaExt {
  /// Returns the single declared type, if exactly one is declared.
  fn single_type(&self) -> Option<SchemaType>;

  /// Returns true if the schema is exactly the given single type.
  fn is_single_type(&self, schema_type: SchemaType) -> bool;

  /// Returns true if the schema declares only the `null` type.
  fn is_null(&self) -> bool;

  /// Returns true if a `null` type appears anywhere in the declared type set.
  fn declares_null(&self) -> bool;

  /// Returns the non-null type from a two-type nullable set
  /// (`[string, null]` -> `string`).
  fn non_null_type(&self) -> Option<SchemaType>;

  /// Returns true if the schema has `oneOf` or `anyOf` branches.
  fn has_union(&self) -> bool;

  /// Returns true if the schema carries object structure: declared
  /// properties, additional properties, or composition branches.
  fn has_object_structure(&self) -> bool;

  /// Returns the inline items schema of an array, ignoring boolean item
  /// schemas.
  fn items_object(&self) -> Option<&oas3::spec::ObjectOrReference<ObjectSchema>>;

  /// Returns true if the schema carries nothing beyond annotations
  /// (title, description, examples).
  fn is_annotation_only(&self) -> bool;
}

impl SchemaExt for ObjectSchema {
  fn single_type(&self) -> Option<SchemaType> {
    match self.schema_type {
      Some(SchemaTypeSet::Single(typ)) => Some(typ),
      _ => None,
    }
  }

  fn is_single_type(&self, schema_type: SchemaType) -> bool {
    self.single_type() == Some(schema_type)
  }

  fn is_null(&self) -> bool {
    self.is_single_type(SchemaType::Null)
  }

  fn declares_null(&self) -> bool {
    match &self.schema_type {
      Some(SchemaTypeSet::Single(typ)) => *typ == SchemaType::Null,
      Some(SchemaTypeSet::Multiple(types)) => types.contains(&SchemaType::Null),
      None => false,
    }
  }

  fn non_null_type(&self) -> Option<SchemaType> {
    match &self.schema_type {
      Some(SchemaTypeSet::Multiple(types)) if types.len() == 2 && types.contains(&SchemaType::Null) => {
        types.iter().find(|t| **t != SchemaType::Null).copied()
      }
      _ => None,
    }
  }

  fn has_union(&self) -> bool {
    !self.one_of.is_empty() || !self.any_of.is_empty()
  }

  fn has_object_structure(&self) -> bool {
    !self.properties.is_empty()
      || self.additional_properties.is_some()
      || !self.all_of.is_empty()
      || self.has_union()
  }

  fn items_object(&self) -> Option<&oas3::spec::ObjectOrReference<ObjectSchema>> {
    self.items.as_ref().and_then(|boxed| match boxed.as_ref() {
      Schema::Object(obj_ref) => Some(obj_ref.as_ref()),
      Schema::Boolean(_) => None,
    })
  }

  fn is_annotation_only(&self) -> bool {
    self.schema_type.is_none()
      && !self.has_object_structure()
      && self.enum_values.is_empty()
      && self.const_value.is_none()
      && self.items.is_none()
      && self.format.is_none()
  }
}
