use oas3::spec::{ObjectOrReference, ObjectSchema, Spec};

use crate::{generator::errors::ResolveError, utils::SchemaExt};

/// Accumulates `allOf` branches into one flattened schema, rejecting
/// branches whose facets contradict each other.
#[derive(Default)]
struct MergeAccumulator {
  schema: ObjectSchema,
  saw_unique_items: bool,
  saw_null: bool,
  saw_format: bool,
}

impl MergeAccumulator {
  fn merge_branch(&mut self, branch: &ObjectSchema) -> Result<(), ResolveError> {
    for (name, prop) in &branch.properties {
      self.schema.properties.insert(name.clone(), prop.clone());
    }
    for required in &branch.required {
      if !self.schema.required.contains(required) {
        self.schema.required.push(required.clone());
      }
    }

    if let Some(unique) = branch.unique_items {
      if self.saw_unique_items && self.schema.unique_items != Some(unique) {
        return Err(ResolveError::IncompatibleComposition { facet: "uniqueItems" });
      }
      self.saw_unique_items = true;
      self.schema.unique_items = Some(unique);
    }

    if branch.schema_type.is_some() {
      let declares_null = branch.declares_null();
      if self.saw_null && self.schema.declares_null() != declares_null {
        return Err(ResolveError::IncompatibleComposition { facet: "nullability" });
      }
      self.saw_null = true;
      if self.schema.schema_type.is_none() {
        self.schema.schema_type = branch.schema_type.clone();
      }
    }

    if let Some(ref format) = branch.format {
      if self.saw_format && self.schema.format.as_deref() != Some(format) {
        return Err(ResolveError::IncompatibleComposition { facet: "format" });
      }
      self.saw_format = true;
      self.schema.format = Some(format.clone());
    }

    if branch.additional_properties.is_some() {
      if self.schema.additional_properties.is_some() {
        return Err(ResolveError::IncompatibleComposition {
          facet: "additionalProperties",
        });
      }
      self.schema.additional_properties = branch.additional_properties.clone();
    }

    merge_optional_facets(&mut self.schema, branch);
    Ok(())
  }

  fn into_schema(self) -> ObjectSchema {
    self.schema
  }
}

fn merge_optional_facets(target: &mut ObjectSchema, source: &ObjectSchema) {
  macro_rules! take_first {
    ($($field:ident),*) => {
      $(if target.$field.is_none() { target.$field = source.$field.clone(); })*
    };
  }
  take_first!(
    title,
    description,
    minimum,
    maximum,
    exclusive_minimum,
    exclusive_maximum,
    min_length,
    max_length,
    min_items,
    max_items,
    pattern,
    items,
    discriminator,
    read_only,
    write_only,
    deprecated,
    const_value
  );
  if target.enum_values.is_empty() {
    target.enum_values = source.enum_values.clone();
  }
  if target.one_of.is_empty() {
    target.one_of = source.one_of.clone();
  }
  if target.any_of.is_empty() {
    target.any_of = source.any_of.clone();
  }
  for (key, value) in &source.extensions {
    target.extensions.entry(key.clone()).or_insert_with(|| value.clone());
  }
}

/// Flattens a schema composed via `allOf` into a single schema. Referenced
/// branches are resolved through the document; nested `allOf` compositions
/// merge recursively.
pub(crate) fn merge_all_of(spec: &Spec, schema: &ObjectSchema) -> Result<ObjectSchema, ResolveError> {
  let mut base = schema.clone();
  base.all_of = vec![];

  let mut acc = MergeAccumulator::default();
  acc.merge_branch(&base)?;

  for branch_ref in &schema.all_of {
    let branch = match branch_ref {
      ObjectOrReference::Object(inline) => inline.clone(),
      ObjectOrReference::Ref { ref_path, .. } => branch_ref
        .resolve(spec)
        .map_err(|_| ResolveError::MalformedReference(ref_path.clone()))?,
    };
    let flattened = if branch.all_of.is_empty() {
      branch
    } else {
      merge_all_of(spec, &branch)?
    };
    acc.merge_branch(&flattened)?;
  }

  Ok(acc.into_schema())
}
