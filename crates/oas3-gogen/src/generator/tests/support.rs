use oas3::Spec;
use serde_json::Value;

use crate::generator::{
  Generator, GeneratorConfig,
  ast::{GeneratedOutput, TypeDefinition},
  metrics::GenerationStats,
};

pub(super) fn parse_spec(document: Value) -> Spec {
  serde_json::from_value(document).expect("failed to parse test document")
}

pub(super) fn generate(document: Value) -> (GeneratedOutput, GenerationStats) {
  generate_with(document, GeneratorConfig::default())
}

pub(super) fn generate_with(document: Value, config: GeneratorConfig) -> (GeneratedOutput, GenerationStats) {
  let spec = parse_spec(document);
  Generator::new(config).generate(&spec).expect("generation should succeed")
}

pub(super) fn find_type<'a>(output: &'a GeneratedOutput, name: &str) -> &'a TypeDefinition {
  output
    .all_types()
    .find(|def| def.name == name)
    .unwrap_or_else(|| panic!("expected a generated type named '{name}'"))
}
