#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]

pub mod generator;
mod utils;

pub use generator::ast::{
  DeclaredLocation, DiscriminatorSpec, EnumEntry, GeneratedOutput, GoType, OperationDefinition, Property,
  TypeDefinition, UnionElement,
};
pub use generator::errors::ResolveError;
pub use generator::extensions::MaskStrategy;
pub use generator::metrics::{GenerationStats, GenerationWarning};
pub use generator::{Generator, GeneratorConfig, IntegerWidth};
