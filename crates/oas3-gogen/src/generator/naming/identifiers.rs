use std::{collections::HashSet, sync::LazyLock};

use any_ascii::any_ascii;

/// Go keywords plus predeclared identifiers. Generated names matching one of
/// these are escaped with a leading underscore.
static GO_RESERVED: LazyLock<HashSet<&str>> = LazyLock::new(|| {
  [
    // Keywords.
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough", "for", "func", "go",
    "goto", "if", "import", "interface", "map", "package", "range", "return", "select", "struct", "switch", "type",
    "var",
    // Predeclared identifiers.
    "any", "bool", "byte", "comparable", "complex64", "complex128", "error", "float32", "float64", "int", "int8",
    "int16", "int32", "int64", "rune", "string", "uint", "uint8", "uint16", "uint32", "uint64", "uintptr", "true",
    "false", "iota", "nil", "append", "cap", "clear", "close", "complex", "copy", "delete", "imag", "len", "make",
    "max", "min", "new", "panic", "print", "println", "real", "recover",
  ]
  .into_iter()
  .collect()
});

/// Initialisms replaced with their canonical all-caps form so generated names
/// read naturally (`userId` -> `UserID`, `httpUrl` -> `HTTPURL`).
static INITIALISMS: LazyLock<HashSet<&str>> = LazyLock::new(|| {
  [
    "ACL", "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GUID", "HTML", "HTTP", "HTTPS", "ID", "IP", "JSON", "LHS",
    "QPS", "RAM", "RHS", "RPC", "SLA", "SMTP", "SQL", "SSH", "TCP", "TLS", "TTL", "UDP", "UI", "UID", "UUID", "URI",
    "URL", "UTF8", "VM", "XML", "XMPP", "XSRF", "XSS",
  ]
  .into_iter()
  .collect()
});

/// Splits an identifier into words on separators and case transitions.
/// `"XMLHttp_request-id"` -> `["XML", "Http", "request", "id"]`.
fn split_words(input: &str) -> Vec<String> {
  let mut words = vec![];
  let mut current = String::new();
  let chars: Vec<char> = input.chars().collect();

  for (i, &ch) in chars.iter().enumerate() {
    if !ch.is_ascii_alphanumeric() {
      if !current.is_empty() {
        words.push(std::mem::take(&mut current));
      }
      continue;
    }

    if ch.is_ascii_uppercase() && !current.is_empty() {
      let prev_is_lower = i > 0 && chars[i - 1].is_ascii_lowercase();
      let next_is_lower = i + 1 < chars.len() && chars[i + 1].is_ascii_lowercase();
      if prev_is_lower || next_is_lower {
        words.push(std::mem::take(&mut current));
      }
    }

    current.push(ch);
  }

  if !current.is_empty() {
    words.push(current);
  }

  words
}

fn capitalize(word: &str) -> String {
  let mut chars = word.chars();
  match chars.next() {
    None => String::new(),
    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
  }
}

/// Converts an arbitrary identifier string into an exported Go name.
///
/// Splits on separators and case transitions, capitalizes each word, and
/// replaces word-aligned initialisms with their canonical all-caps form.
/// Deterministic and idempotent on already-normalized input.
pub(crate) fn normalize(raw: &str) -> String {
  let ascii = any_ascii(raw);

  split_words(&ascii)
    .iter()
    .map(|word| {
      let upper = word.to_ascii_uppercase();
      if INITIALISMS.contains(upper.as_str()) {
        upper
      } else {
        capitalize(word)
      }
    })
    .collect()
}

/// Maps the symbol and digit characters at the start of a string to word
/// fragments so generated identifiers never start illegally.
///
/// Returns `""` when the string starts with a letter. Only characters before
/// the first alphanumeric are inspected; a leading digit contributes `"N"`.
pub(crate) fn type_name_prefix(raw: &str) -> String {
  let mut prefix = String::new();

  for ch in any_ascii(raw).chars() {
    if ch.is_ascii_alphabetic() {
      break;
    }
    if ch.is_ascii_digit() {
      prefix.push('N');
      break;
    }
    prefix.push_str(symbol_fragment(ch));
  }

  prefix
}

fn symbol_fragment(ch: char) -> &'static str {
  match ch {
    '-' => "Minus",
    '+' => "Plus",
    '#' => "Hash",
    '@' => "At",
    '$' => "Dollar",
    '%' => "Percent",
    '&' => "And",
    '*' => "Asterisk",
    '/' => "Slash",
    '\\' => "Backslash",
    '.' => "Dot",
    '<' => "LessThan",
    '>' => "GreaterThan",
    '=' => "Equal",
    '!' => "Bang",
    '?' => "Question",
    '~' => "Tilde",
    '^' => "Caret",
    '|' => "Pipe",
    ':' => "Colon",
    ';' => "Semicolon",
    ',' => "Comma",
    _ => "",
  }
}

/// Escapes Go keywords and predeclared identifiers with a leading underscore.
pub(crate) fn escape_reserved(name: String) -> String {
  if GO_RESERVED.contains(name.as_str()) {
    format!("_{name}")
  } else {
    name
  }
}

/// Full pipeline for a generated Go type name: symbol/digit prefix, then
/// initialism-aware normalization, then keyword escaping. Empty input falls
/// back to `"Value"`.
pub(crate) fn go_type_name(raw: &str) -> String {
  let name = format!("{}{}", type_name_prefix(raw), normalize(raw));
  if name.is_empty() {
    return "Value".to_string();
  }
  escape_reserved(name)
}

/// Name for a generated enum constant. Constants share the type-name rules
/// but fall back to `"Empty"` for value strings that sanitize away entirely.
pub(crate) fn go_const_name(raw: &str) -> String {
  let name = format!("{}{}", type_name_prefix(raw), normalize(raw));
  if name.is_empty() {
    return "Empty".to_string();
  }
  escape_reserved(name)
}
