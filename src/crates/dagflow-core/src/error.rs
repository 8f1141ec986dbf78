//! Error types for workflow compilation and execution.
//!
//! Compile-stage problems (malformed documents, unknown node references,
//! cycles, unknown node types) surface before any node is dispatched.
//! Execution-stage problems abort the run. Template expansion and guard
//! evaluation failures are deliberately *not* represented here: expansion
//! fails open (original text is kept) and guards fail closed (the branch is
//! suppressed), both with a logged diagnostic.

use thiserror::Error;

/// Result type for all workflow operations.
pub type Result<T> = std::result::Result<T, WorkflowError>;

/// Errors produced by the DSL compiler and the workflow engine.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The workflow document is structurally invalid: a referenced node is
    /// undefined, or the dependency graph contains a cycle.
    #[error("compile error: {0}")]
    Compile(String),

    /// A node declares a type tag with no registered factory.
    #[error("unknown node type '{node_type}' for node '{node}'")]
    UnknownNodeType { node: String, node_type: String },

    /// A node's `run` failed. Fatal for the run.
    #[error("node '{node}' failed: {message}")]
    NodeExecution { node: String, message: String },

    /// The scheduler made no progress with work still pending. Unreachable
    /// for a graph that passed compile-time validation; kept as an
    /// invariant guard.
    #[error("deadlock detected, pending nodes: {}", pending.join(", "))]
    Deadlock { pending: Vec<String> },

    /// The document failed YAML deserialization.
    #[error("invalid workflow document: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl WorkflowError {
    /// Construct a [`WorkflowError::NodeExecution`] from a node id and any
    /// displayable cause.
    pub fn node_execution(node: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        WorkflowError::NodeExecution {
            node: node.into(),
            message: cause.to_string(),
        }
    }
}
