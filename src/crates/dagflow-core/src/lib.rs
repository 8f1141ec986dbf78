//! # dagflow-core — DSL-driven concurrent workflow execution
//!
//! Executes user-authored workflows expressed as a DAG of typed nodes. A
//! YAML document declares nodes, per-node inputs (literals or
//! `{{ node.field }}` templates referencing other nodes' outputs), optional
//! conditional guards, and explicit or data-flow-inferred edges. The engine
//! resolves dependencies, schedules nodes concurrently, propagates skips
//! along guarded branches, and aggregates every node's output in a shared
//! memory keyed by node id.
//!
//! ## Pipeline
//!
//! ```text
//! YAML document ──parse_workflow──▶ WorkflowGraph ──WorkflowEngine──▶ GlobalMemory
//! ```
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use dagflow_core::{parse_workflow, GlobalMemory, WorkflowEngine};
//! use serde_json::json;
//!
//! let graph = parse_workflow(r#"
//! id: hello
//! nodes:
//!   a:
//!     type: print
//!     inputs: {message: "hi"}
//!     next: [b]
//!   b:
//!     type: print
//!     inputs: {message: "{{ a.printed }}!"}
//! "#)?;
//!
//! let memory = Arc::new(GlobalMemory::with_inputs(json!({})));
//! let engine = WorkflowEngine::new(Arc::new(graph), memory.clone());
//! engine.run().await?;
//!
//! assert_eq!(memory.get("b.printed"), Some(json!("hi!")));
//! # Ok::<(), dagflow_core::WorkflowError>(())
//! ```

pub mod dsl;
pub mod engine;
pub mod error;
pub mod graph;
pub mod memory;
pub mod node;
pub mod nodes;
pub mod template;

pub use dsl::parse_workflow;
pub use engine::{WorkflowEngine, DEFAULT_CONCURRENCY};
pub use error::{Result, WorkflowError};
pub use graph::{NodeId, NodeSpec, WorkflowGraph};
pub use memory::{GlobalMemory, INPUTS_KEY};
pub use node::{Node, NodeRegistry};
pub use template::{evaluate_guard, expand, expand_text};
