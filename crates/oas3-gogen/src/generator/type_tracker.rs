use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;

use crate::generator::{
  ast::{GO_ANY, TypeDefinition},
  errors::ResolveError,
};

/// Registry of every named type produced during one generation run.
///
/// Created fresh per run and threaded by reference through the traversal;
/// registration order is preserved so the rendered output is stable across
/// runs. Names are never removed, and per-base counters are monotonic so a
/// collision suffix is never reissued.
#[derive(Debug, Default)]
pub struct TypeTracker {
  by_name: IndexMap<String, TypeDefinition>,
  by_origin_ref: BTreeMap<String, String>,
  reserved: BTreeSet<String>,
  counters: BTreeMap<String, u64>,
  needs_error_impl: BTreeSet<String>,
}

impl TypeTracker {
  pub fn new() -> Self {
    Self::default()
  }

  /// Stores or overwrites the definition under its name. An origin
  /// reference, when carried, also records the reference-to-name mapping so
  /// later resolutions of the same reference short-circuit.
  pub fn register(&mut self, def: TypeDefinition) {
    if let Some(origin) = &def.origin_ref {
      self.by_origin_ref.insert(origin.clone(), def.name.clone());
    }
    self.reserved.insert(def.name.clone());
    self.by_name.insert(def.name.clone(), def);
  }

  /// Reserves a name without attaching a definition. Idempotent; never
  /// displaces an existing entry.
  pub fn register_name_only(&mut self, name: &str) {
    self.reserved.insert(name.to_string());
  }

  /// Records that `origin_ref` resolves to the (possibly renamed) `name`,
  /// used by the pre-registration pass so forward references land on final
  /// names.
  pub fn assign_origin(&mut self, origin_ref: &str, name: &str) {
    self.by_origin_ref.insert(origin_ref.to_string(), name.to_string());
  }

  fn is_taken(&self, name: &str) -> bool {
    self.reserved.contains(name) || self.by_name.contains_key(name)
  }

  /// Returns `base` if unused, else the first free `base + suffix`, else
  /// `base + N` with a per-base counter that never reissues an integer.
  pub fn generate_unique_name(&mut self, base: &str, preferred_suffixes: &[&str]) -> String {
    if !self.is_taken(base) {
      return base.to_string();
    }

    for suffix in preferred_suffixes {
      let candidate = format!("{base}{suffix}");
      if !self.is_taken(&candidate) {
        return candidate;
      }
    }

    loop {
      let counter = self.counters.entry(base.to_string()).or_insert(1);
      let candidate = format!("{base}{counter}");
      *counter += 1;
      if !self.is_taken(&candidate) {
        return candidate;
      }
    }
  }

  /// Finds a base string whose `base + derived_suffix` is free, numbering
  /// the base itself when needed. Returns the base, not the derived name.
  pub fn generate_unique_base_name(&mut self, base: &str, derived_suffix: &str) -> String {
    if !self.is_taken(&format!("{base}{derived_suffix}")) {
      return base.to_string();
    }
    let mut n = 1u64;
    loop {
      let candidate_base = format!("{base}{n}");
      if !self.is_taken(&format!("{candidate_base}{derived_suffix}")) {
        return candidate_base;
      }
      n += 1;
    }
  }

  /// Follows `type X = Y` alias links to the terminal definition's name.
  /// A cyclic chain returns the name where the cycle was entered.
  pub fn resolve_alias_chain(&self, name: &str) -> String {
    let mut seen = BTreeSet::new();
    let mut current = name.to_string();

    while seen.insert(current.clone()) {
      let Some(def) = self.by_name.get(&current) else {
        break;
      };
      if !def.schema.define_via_alias {
        break;
      }
      let Some(next) = def.schema.named_ref.clone() else {
        break;
      };
      current = next;
    }

    current
  }

  /// Marks the terminal type of `name`'s alias chain as needing an
  /// error-interface implementation. The unconstrained `any` type is left
  /// unmarked: Go cannot attach methods to it.
  pub fn mark_needs_error_impl(&mut self, name: &str) {
    let terminal = self.resolve_alias_chain(name);
    if terminal == GO_ANY {
      return;
    }
    if let Some(def) = self.by_name.get(&terminal)
      && def.schema.is_primitive_alias
      && def.schema.type_decl() == GO_ANY
    {
      return;
    }
    self.needs_error_impl.insert(terminal);
  }

  pub fn lookup(&self, name: &str) -> Option<&TypeDefinition> {
    self.by_name.get(name)
  }

  pub fn lookup_origin(&self, origin_ref: &str) -> Option<&str> {
    self.by_origin_ref.get(origin_ref).map(String::as_str)
  }

  /// Lookup that fails with the missing name attached; callers surface the
  /// error up the chain rather than panicking.
  pub fn require(&self, name: &str) -> Result<&TypeDefinition, ResolveError> {
    self
      .by_name
      .get(name)
      .ok_or_else(|| ResolveError::UnknownType(name.to_string()))
  }

  /// All registered definitions in registration order.
  pub fn definitions(&self) -> impl Iterator<Item = &TypeDefinition> {
    self.by_name.values()
  }

  pub fn into_definitions(self) -> Vec<TypeDefinition> {
    self.by_name.into_values().collect()
  }

  pub fn error_type_names(&self) -> Vec<String> {
    self.needs_error_impl.iter().cloned().collect()
  }
}
