pub(crate) mod refs;
pub(crate) mod schema_ext;

pub(crate) use refs::RefTarget;
pub(crate) use schema_ext::SchemaExt;

/// Splits a description into doc lines, trimming trailing whitespace.
pub(crate) fn doc_lines(description: &str) -> Vec<String> {
  description.lines().map(|line| line.trim_end().to_string()).collect()
}
