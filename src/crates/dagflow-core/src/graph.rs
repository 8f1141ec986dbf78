//! Compiled workflow graph types.
//!
//! A [`WorkflowGraph`] is produced once by the DSL compiler
//! ([`crate::dsl::parse_workflow`]) and is immutable for the duration of a
//! run: node specs, the dependency set per node, and the successor list per
//! node. Dependencies combine explicit `depends_on` entries, implicit
//! references inferred from `{{ node.field }}` templates in inputs, and the
//! reverse edges of `next`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// Node identifier - unique name for each node in the graph.
pub type NodeId = String;

/// Declaration of a single node in the workflow document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Unique node id. Filled from the mapping key by the compiler.
    #[serde(skip)]
    pub id: NodeId,

    /// Type tag selecting a node implementation from the registry.
    #[serde(rename = "type")]
    pub node_type: String,

    /// Parameter name to literal-or-template value.
    #[serde(default)]
    pub inputs: Map<String, Value>,

    /// Optional boolean guard, rendered against memory at dispatch time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    /// Explicit upstream dependencies.
    #[serde(default)]
    pub depends_on: Vec<NodeId>,

    /// Explicit downstream successors. A scalar is accepted in the document.
    #[serde(default, deserialize_with = "string_or_seq")]
    pub next: Vec<NodeId>,
}

/// A compiled, validated workflow DAG.
#[derive(Debug, Clone)]
pub struct WorkflowGraph {
    /// Workflow id from the document (`unnamed_workflow` if absent).
    pub workflow_id: String,

    /// Document version string (`1.0` if absent).
    pub version: String,

    /// Advisory entry node; not enforced by the engine.
    pub start: Option<NodeId>,

    /// All node declarations, keyed by id.
    pub nodes: HashMap<NodeId, NodeSpec>,

    /// Upstream dependency set per node.
    pub deps: HashMap<NodeId, HashSet<NodeId>>,

    /// Downstream successor list per node, in document order.
    pub successors: HashMap<NodeId, Vec<NodeId>>,
}

impl WorkflowGraph {
    /// Dependency set for a node; empty if the node has none.
    pub fn dependencies(&self, id: &str) -> &HashSet<NodeId> {
        static EMPTY: std::sync::OnceLock<HashSet<NodeId>> = std::sync::OnceLock::new();
        self.deps
            .get(id)
            .unwrap_or_else(|| EMPTY.get_or_init(HashSet::new))
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Accept `next: other_node` as shorthand for `next: [other_node]`.
fn string_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(single) => vec![single],
        OneOrMany::Many(many) => many,
    })
}
