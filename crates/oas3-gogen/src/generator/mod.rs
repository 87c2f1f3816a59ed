use oas3::Spec;

use crate::generator::{ast::GeneratedOutput, metrics::GenerationStats};

pub mod ast;
pub(crate) mod collector;
pub mod constraints;
pub(crate) mod dependency_graph;
pub mod errors;
pub mod extensions;
pub mod metrics;
pub(crate) mod naming;
pub(crate) mod resolver;
pub mod type_tracker;

#[cfg(test)]
mod tests;

/// Width used for integers without an explicit format hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegerWidth {
  #[default]
  Int,
  Int8,
  Int16,
  Int32,
  Int64,
  Uint,
  Uint8,
  Uint16,
  Uint32,
  Uint64,
}

impl IntegerWidth {
  pub fn as_go_type(self) -> &'static str {
    match self {
      Self::Int => "int",
      Self::Int8 => "int8",
      Self::Int16 => "int16",
      Self::Int32 => "int32",
      Self::Int64 => "int64",
      Self::Uint => "uint",
      Self::Uint8 => "uint8",
      Self::Uint16 => "uint16",
      Self::Uint32 => "uint32",
      Self::Uint64 => "uint64",
    }
  }
}

/// Options threaded by reference through the whole resolution context.
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfig {
  pub default_integer_width: IntegerWidth,
  /// Suppress carrying schema descriptions into output docs.
  pub omit_descriptions: bool,
  /// Always include the owning type's name in enum constant names, even
  /// without a collision.
  pub always_prefix_enum_values: bool,
  /// Suppress the validation-token list entirely; presence flags still
  /// apply.
  pub skip_validation_tags: bool,
  /// Output tag name to source attribute (`description` or a vendor
  /// extension key) copied onto every property where the source is present.
  pub auto_extra_tags: std::collections::BTreeMap<String, String>,
}

/// Entry point: resolves a parsed OpenAPI document into the grouped set of
/// Go type definitions and operations for the renderer.
pub struct Generator {
  config: GeneratorConfig,
}

impl Generator {
  pub fn new(config: GeneratorConfig) -> Self {
    Self { config }
  }

  pub fn generate(&self, spec: &Spec) -> anyhow::Result<(GeneratedOutput, GenerationStats)> {
    collector::Collector::new(spec, &self.config).collect()
  }
}
