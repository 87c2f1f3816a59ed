use thiserror::Error;

/// Hard failures during schema resolution.
///
/// Every variant is terminal for the generation run. Callers wrap these with
/// `anyhow::Context` so the chain names the schema, operation, or property
/// being processed when the failure occurred.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
  #[error("malformed schema reference '{0}'")]
  MalformedReference(String),

  #[error("no type mapping for schema kind '{0}'")]
  UnhandledKind(String),

  #[error("conflicting '{facet}' values while merging allOf branches")]
  IncompatibleComposition { facet: &'static str },

  #[error("cannot determine discriminator value for inline union branch at index {branch_index}")]
  AmbiguousDiscriminator { branch_index: usize },

  #[error("discriminator mapping covers {mapped} of {total} union branches")]
  IncompleteDiscriminatorMapping { mapped: usize, total: usize },

  #[error("type '{0}' was never registered")]
  UnknownType(String),

  #[error("extension '{key}' is malformed: expected {expected}")]
  MalformedExtension { key: &'static str, expected: &'static str },
}
