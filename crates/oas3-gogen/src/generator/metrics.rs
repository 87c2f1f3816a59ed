use strum::Display;

use crate::generator::ast::{GoType, TypeDefinition};

#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize)]
pub struct GenerationStats {
  pub types_generated: usize,
  pub structs_generated: usize,
  pub enums_generated: usize,
  pub type_aliases_generated: usize,
  pub unions_generated: usize,
  pub operations_converted: usize,
  pub cycles_detected: usize,
  pub cycle_details: Vec<Vec<String>>,
  pub warnings: Vec<GenerationWarning>,
}

impl GenerationStats {
  pub fn record_struct(&mut self) {
    self.structs_generated += 1;
    self.types_generated += 1;
  }

  pub fn record_enum(&mut self) {
    self.enums_generated += 1;
    self.types_generated += 1;
  }

  pub fn record_type_alias(&mut self) {
    self.type_aliases_generated += 1;
    self.types_generated += 1;
  }

  pub fn record_union(&mut self) {
    self.unions_generated += 1;
    self.types_generated += 1;
  }

  pub fn record_type(&mut self, def: &TypeDefinition) {
    self.record_descriptor(&def.schema);
  }

  fn record_descriptor(&mut self, schema: &GoType) {
    if !schema.union_elements.is_empty() {
      self.record_union();
    } else if !schema.enum_entries.is_empty() {
      self.record_enum();
    } else if !schema.properties.is_empty() {
      self.record_struct();
    } else {
      self.record_type_alias();
    }
  }

  pub fn record_operation(&mut self) {
    self.operations_converted += 1;
  }

  pub fn record_cycle(&mut self, cycle: Vec<String>) {
    self.cycles_detected += 1;
    self.cycle_details.push(cycle);
  }

  pub fn record_cycles(&mut self, cycles: Vec<Vec<String>>) {
    for cycle in cycles {
      self.record_cycle(cycle);
    }
  }

  pub fn record_warning(&mut self, warning: GenerationWarning) {
    self.warnings.push(warning);
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Display, serde::Serialize)]
pub enum GenerationWarning {
  #[strum(to_string = "Parameter '{name}' on {method} {path} has no schema; treated as string")]
  ParameterWithoutSchema {
    name: String,
    method: String,
    path: String,
  },
  #[strum(to_string = "Operation {method} {path} has no operationId; derived '{derived}'")]
  MissingOperationId {
    method: String,
    path: String,
    derived: String,
  },
  #[strum(to_string = "Property '{property}' declares an invalid pattern regex: {pattern}")]
  InvalidPatternRegex { property: String, pattern: String },
  #[strum(to_string = "Response {status} of '{operation_id}' has no JSON content; skipped")]
  ResponseWithoutContent { status: String, operation_id: String },
}
