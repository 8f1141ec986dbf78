//! DSL parser and graph compiler.
//!
//! Ingests the declarative workflow document and produces a validated
//! [`WorkflowGraph`]. Dependency inference, applied to every node `b`:
//!
//! 1. every id in `b.depends_on` is a dependency of `b`;
//! 2. every `{{ <id>.<field> }}` reference found in a string leaf of
//!    `b.inputs` adds `<id>`, provided it names a defined node and is not
//!    the reserved `inputs` key;
//! 3. for every node `a` with `b` in `a.next`, `a` is a dependency of `b`.
//!
//! After inference the compiler rejects references to undefined nodes and
//! any cycle in the dependency relation.

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use crate::error::{Result, WorkflowError};
use crate::graph::{NodeId, NodeSpec, WorkflowGraph};
use crate::memory::INPUTS_KEY;

#[derive(Debug, Deserialize)]
struct WorkflowDoc {
    id: Option<String>,
    version: Option<String>,
    start: Option<String>,
    #[serde(default)]
    nodes: HashMap<String, NodeSpec>,
}

/// Pattern capturing the node id of a `{{ node_id.field }}` reference.
fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\.[A-Za-z0-9_]+\s*\}\}").expect("valid regex")
    })
}

/// Parse a workflow document and compile it into a [`WorkflowGraph`].
pub fn parse_workflow(yaml: &str) -> Result<WorkflowGraph> {
    let doc: WorkflowDoc = serde_yaml::from_str(yaml)?;

    let mut nodes: HashMap<NodeId, NodeSpec> = HashMap::with_capacity(doc.nodes.len());
    for (id, mut spec) in doc.nodes {
        spec.id = id.clone();
        nodes.insert(id, spec);
    }

    let mut deps: HashMap<NodeId, HashSet<NodeId>> = HashMap::with_capacity(nodes.len());
    let mut successors: HashMap<NodeId, Vec<NodeId>> = HashMap::with_capacity(nodes.len());

    for (id, spec) in &nodes {
        let entry = deps.entry(id.clone()).or_default();

        for dep in &spec.depends_on {
            if !nodes.contains_key(dep) {
                return Err(WorkflowError::Compile(format!(
                    "node '{id}' depends on undefined node '{dep}'"
                )));
            }
            entry.insert(dep.clone());
        }

        for referenced in referenced_nodes(&Value::Object(spec.inputs.clone())) {
            if referenced != INPUTS_KEY && nodes.contains_key(&referenced) {
                entry.insert(referenced);
            }
        }

        successors.insert(id.clone(), spec.next.clone());
    }

    // Reverse edges: a.next = [b] makes a a dependency of b.
    for (id, spec) in &nodes {
        for target in &spec.next {
            if !nodes.contains_key(target) {
                return Err(WorkflowError::Compile(format!(
                    "node '{id}' lists undefined node '{target}' in next"
                )));
            }
            deps.entry(target.clone()).or_default().insert(id.clone());
        }
    }

    check_acyclic(&nodes, &deps)?;

    Ok(WorkflowGraph {
        workflow_id: doc.id.unwrap_or_else(|| "unnamed_workflow".to_string()),
        version: doc.version.unwrap_or_else(|| "1.0".to_string()),
        start: doc.start,
        nodes,
        deps,
        successors,
    })
}

/// Collect every node id referenced by a template marker in any string leaf.
fn referenced_nodes(value: &Value) -> HashSet<NodeId> {
    let mut found = HashSet::new();
    collect_references(value, &mut found);
    found
}

fn collect_references(value: &Value, found: &mut HashSet<NodeId>) {
    match value {
        Value::String(text) => {
            for capture in reference_pattern().captures_iter(text) {
                found.insert(capture[1].to_string());
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_references(item, found);
            }
        }
        Value::Object(fields) => {
            for item in fields.values() {
                collect_references(item, found);
            }
        }
        _ => {}
    }
}

/// Depth-first cycle check over the dependency relation. A cycle is a
/// compile error naming the participating node ids.
fn check_acyclic(
    nodes: &HashMap<NodeId, NodeSpec>,
    deps: &HashMap<NodeId, HashSet<NodeId>>,
) -> Result<()> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }

    fn visit(
        id: &str,
        deps: &HashMap<NodeId, HashSet<NodeId>>,
        marks: &mut HashMap<NodeId, Mark>,
        stack: &mut Vec<NodeId>,
    ) -> Result<()> {
        match marks.get(id).copied().unwrap_or(Mark::Unvisited) {
            Mark::Done => return Ok(()),
            Mark::InProgress => {
                let cycle_start = stack.iter().position(|n| n == id).unwrap_or(0);
                let mut cycle: Vec<NodeId> = stack[cycle_start..].to_vec();
                cycle.sort();
                return Err(WorkflowError::Compile(format!(
                    "cycle detected involving nodes: {}",
                    cycle.join(", ")
                )));
            }
            Mark::Unvisited => {}
        }
        marks.insert(id.to_string(), Mark::InProgress);
        stack.push(id.to_string());
        if let Some(upstream) = deps.get(id) {
            for dep in upstream {
                visit(dep, deps, marks, stack)?;
            }
        }
        stack.pop();
        marks.insert(id.to_string(), Mark::Done);
        Ok(())
    }

    let mut marks = HashMap::with_capacity(nodes.len());
    let mut stack = Vec::new();
    let mut ids: Vec<&NodeId> = nodes.keys().collect();
    ids.sort();
    for id in ids {
        visit(id, deps, &mut marks, &mut stack)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINEAR: &str = r#"
id: linear_demo
version: "1.0"
start: a
nodes:
  a:
    type: print
    inputs:
      message: "hi"
    next: [b]
  b:
    type: print
    inputs:
      message: "{{ a.printed }}!"
"#;

    #[test]
    fn parses_ids_version_and_start() {
        let graph = parse_workflow(LINEAR).unwrap();
        assert_eq!(graph.workflow_id, "linear_demo");
        assert_eq!(graph.version, "1.0");
        assert_eq!(graph.start.as_deref(), Some("a"));
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn defaults_for_missing_id_and_version() {
        let graph = parse_workflow("nodes:\n  only:\n    type: print\n").unwrap();
        assert_eq!(graph.workflow_id, "unnamed_workflow");
        assert_eq!(graph.version, "1.0");
        assert!(graph.start.is_none());
    }

    #[test]
    fn next_creates_reverse_dependency() {
        let graph = parse_workflow(LINEAR).unwrap();
        assert!(graph.dependencies("b").contains("a"));
        assert_eq!(graph.successors["a"], vec!["b".to_string()]);
    }

    #[test]
    fn template_references_are_inferred() {
        let yaml = r#"
nodes:
  root:
    type: math
    inputs: {a: 1, b: 2, op: add}
  user:
    type: math
    inputs:
      a: "{{ root.result }}"
      b: "{{ inputs.b }}"
      op: add
"#;
        let graph = parse_workflow(yaml).unwrap();
        assert!(graph.dependencies("user").contains("root"));
        // the reserved `inputs` key is not a node reference
        assert_eq!(graph.dependencies("user").len(), 1);
        assert!(graph.dependencies("root").is_empty());
    }

    #[test]
    fn references_in_nested_inputs_are_found() {
        let yaml = r#"
nodes:
  src:
    type: print
    inputs: {message: hello}
  sink:
    type: format
    inputs:
      parts:
        - "{{ src.printed }}"
        - plain
      meta:
        origin: "{{ src.printed }}"
"#;
        let graph = parse_workflow(yaml).unwrap();
        assert!(graph.dependencies("sink").contains("src"));
    }

    #[test]
    fn scalar_next_is_accepted() {
        let yaml = r#"
nodes:
  a:
    type: print
    inputs: {message: x}
    next: b
  b:
    type: print
    inputs: {message: y}
"#;
        let graph = parse_workflow(yaml).unwrap();
        assert_eq!(graph.successors["a"], vec!["b".to_string()]);
        assert!(graph.dependencies("b").contains("a"));
    }

    #[test]
    fn explicit_depends_on_is_honoured() {
        let yaml = r#"
nodes:
  a:
    type: print
    inputs: {message: x}
  b:
    type: print
    inputs: {message: y}
    depends_on: [a]
"#;
        let graph = parse_workflow(yaml).unwrap();
        assert!(graph.dependencies("b").contains("a"));
    }

    #[test]
    fn undefined_references_are_rejected() {
        let depends = r#"
nodes:
  a:
    type: print
    depends_on: [ghost]
"#;
        assert!(matches!(
            parse_workflow(depends),
            Err(WorkflowError::Compile(_))
        ));

        let next = r#"
nodes:
  a:
    type: print
    next: [ghost]
"#;
        assert!(matches!(
            parse_workflow(next),
            Err(WorkflowError::Compile(_))
        ));
    }

    #[test]
    fn cycles_are_rejected_with_participants() {
        let yaml = r#"
nodes:
  a:
    type: print
    depends_on: [b]
  b:
    type: print
    depends_on: [a]
"#;
        let err = parse_workflow(yaml).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("cycle"));
        assert!(message.contains('a') && message.contains('b'));
    }

    #[test]
    fn undefined_template_reference_is_not_a_dependency() {
        // A template naming an undefined node is left for expansion to
        // handle (it renders empty); it is not an inferred edge.
        let yaml = r#"
nodes:
  a:
    type: print
    inputs:
      message: "{{ ghost.value }}"
"#;
        let graph = parse_workflow(yaml).unwrap();
        assert!(graph.dependencies("a").is_empty());
    }

    #[test]
    fn malformed_document_is_a_yaml_error() {
        assert!(matches!(
            parse_workflow("nodes: [not, a, mapping]"),
            Err(WorkflowError::Yaml(_))
        ));
    }
}
