use std::collections::{BTreeMap, BTreeSet};

use oas3::spec::{ObjectOrReference, ObjectSchema, Schema};
use petgraph::{algo::kosaraju_scc, graphmap::DiGraphMap};

use crate::utils::refs::component_ref_name;

/// Component-to-component reference edges, built once before resolution.
///
/// Cyclic components are recorded into the run's stats and inform the
/// marshaler decision for self-referential types; the resolver's own
/// visited-set still guards the actual traversal.
#[derive(Debug, Default)]
pub(crate) struct DependencyGraph {
  dependencies: BTreeMap<String, BTreeSet<String>>,
  cyclic: BTreeSet<String>,
}

impl DependencyGraph {
  pub(crate) fn build(schemas: &BTreeMap<String, ObjectSchema>) -> Self {
    let dependencies = schemas
      .iter()
      .map(|(name, schema)| {
        let mut refs = BTreeSet::new();
        collect_refs(schema, &mut refs);
        (name.clone(), refs)
      })
      .collect();

    let mut graph = Self {
      dependencies,
      cyclic: BTreeSet::new(),
    };
    for cycle in graph.detect_cycles() {
      graph.cyclic.extend(cycle);
    }
    graph
  }

  pub(crate) fn detect_cycles(&self) -> Vec<Vec<String>> {
    let mut graph = DiGraphMap::<&str, ()>::new();
    for (node, deps) in &self.dependencies {
      graph.add_node(node.as_str());
      for dep in deps {
        graph.add_edge(node.as_str(), dep.as_str(), ());
      }
    }

    kosaraju_scc(&graph)
      .into_iter()
      .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
      .map(|scc| scc.into_iter().map(String::from).collect())
      .collect()
  }

  pub(crate) fn is_cyclic(&self, schema_name: &str) -> bool {
    self.cyclic.contains(schema_name)
  }
}

fn collect_refs(schema: &ObjectSchema, refs: &mut BTreeSet<String>) {
  let mut collect_from = |schema_ref: &ObjectOrReference<ObjectSchema>, refs: &mut BTreeSet<String>| {
    if let Some(name) = component_ref_name(schema_ref) {
      refs.insert(name);
    }
    if let ObjectOrReference::Object(inline) = schema_ref {
      collect_refs(inline, refs);
    }
  };

  for prop_schema in schema.properties.values() {
    collect_from(prop_schema, refs);
  }

  for schema_ref in schema.one_of.iter().chain(&schema.any_of).chain(&schema.all_of) {
    collect_from(schema_ref, refs);
  }

  if let Some(ref items_box) = schema.items
    && let Schema::Object(ref schema_ref) = **items_box
  {
    collect_from(schema_ref, refs);
  }

  if let Some(Schema::Object(ref schema_ref)) = schema.additional_properties {
    collect_from(schema_ref, refs);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::utils::refs::component_ref_path;

  fn ref_to(name: &str) -> ObjectOrReference<ObjectSchema> {
    ObjectOrReference::Ref {
      ref_path: component_ref_path(name),
      summary: None,
      description: None,
    }
  }

  #[test]
  fn test_self_reference_is_cyclic() {
    let mut node = ObjectSchema::default();
    node.properties.insert("next".to_string(), ref_to("Node"));

    let mut schemas = BTreeMap::new();
    schemas.insert("Node".to_string(), node);
    schemas.insert("Leaf".to_string(), ObjectSchema::default());

    let graph = DependencyGraph::build(&schemas);
    assert!(graph.is_cyclic("Node"));
    assert!(!graph.is_cyclic("Leaf"));
  }

  #[test]
  fn test_mutual_reference_cycle() {
    let mut a = ObjectSchema::default();
    a.properties.insert("b".to_string(), ref_to("B"));
    let mut b = ObjectSchema::default();
    b.properties.insert("a".to_string(), ref_to("A"));

    let mut schemas = BTreeMap::new();
    schemas.insert("A".to_string(), a);
    schemas.insert("B".to_string(), b);

    let graph = DependencyGraph::build(&schemas);
    let cycles = graph.detect_cycles();
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].len(), 2);
  }

  #[test]
  fn test_acyclic_chain_reports_no_cycles() {
    let mut a = ObjectSchema::default();
    a.properties.insert("b".to_string(), ref_to("B"));

    let mut schemas = BTreeMap::new();
    schemas.insert("A".to_string(), a);
    schemas.insert("B".to_string(), ObjectSchema::default());

    let graph = DependencyGraph::build(&schemas);
    assert!(graph.detect_cycles().is_empty());
  }
}
