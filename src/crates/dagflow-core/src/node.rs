//! Node contract and type registry.
//!
//! A node is a typed unit of work: it consumes an already-resolved input
//! map (templates expanded by the engine) and returns an output map that
//! becomes its memory entry. Nodes hold no state across invocations and
//! must be safe to call concurrently with other nodes — they may block on
//! external I/O but never touch [`GlobalMemory`](crate::memory::GlobalMemory)
//! directly.
//!
//! Implementations are selected by type tag through [`NodeRegistry`]. The
//! built-in catalogue is closed but the registry is open to extension:
//! register a factory under a new tag and the DSL can use it immediately.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Result, WorkflowError};
use crate::graph::NodeSpec;
use crate::nodes;

/// A unit of work executable by the engine.
#[async_trait]
pub trait Node: Send + Sync + std::fmt::Debug {
    /// The node's id within the workflow.
    fn id(&self) -> &str;

    /// Execute with resolved inputs, returning the output map the engine
    /// writes to memory under this node's id.
    async fn run(&self, inputs: Map<String, Value>) -> Result<Map<String, Value>>;
}

/// Factory constructing a node implementation from its declaration.
pub type NodeFactory = Arc<dyn Fn(&NodeSpec) -> Arc<dyn Node> + Send + Sync>;

/// Registry from type tag to node factory.
pub struct NodeRegistry {
    factories: HashMap<String, NodeFactory>,
}

impl NodeRegistry {
    /// An empty registry with no node types.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// A registry pre-loaded with the built-in node set.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("sleep", |spec| Arc::new(nodes::SleepNode::new(&spec.id)));
        registry.register("print", |spec| Arc::new(nodes::PrintNode::new(&spec.id)));
        registry.register("math", |spec| Arc::new(nodes::MathNode::new(&spec.id)));
        registry.register("intent_classifier", |spec| {
            Arc::new(nodes::IntentClassifierNode::new(&spec.id))
        });
        registry.register("router", |spec| Arc::new(nodes::RouterNode::new(&spec.id)));
        registry.register("mock_search", |spec| {
            Arc::new(nodes::MockSearchNode::new(&spec.id))
        });
        registry.register("llm", |spec| Arc::new(nodes::LlmNode::new(&spec.id)));
        registry.register("format", |spec| Arc::new(nodes::FormatNode::new(&spec.id)));
        registry
    }

    /// Register a factory under a type tag, replacing any previous one.
    pub fn register<F>(&mut self, tag: &str, factory: F)
    where
        F: Fn(&NodeSpec) -> Arc<dyn Node> + Send + Sync + 'static,
    {
        self.factories.insert(tag.to_string(), Arc::new(factory));
    }

    /// True when a factory is registered for the tag.
    pub fn contains(&self, tag: &str) -> bool {
        self.factories.contains_key(tag)
    }

    /// Construct the implementation for a node declaration.
    pub fn create(&self, spec: &NodeSpec) -> Result<Arc<dyn Node>> {
        let factory = self
            .factories
            .get(&spec.node_type)
            .ok_or_else(|| WorkflowError::UnknownNodeType {
                node: spec.id.clone(),
                node_type: spec.node_type.clone(),
            })?;
        Ok(factory(spec))
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(id: &str, node_type: &str) -> NodeSpec {
        NodeSpec {
            id: id.to_string(),
            node_type: node_type.to_string(),
            inputs: Map::new(),
            condition: None,
            depends_on: Vec::new(),
            next: Vec::new(),
        }
    }

    #[test]
    fn builtins_are_registered() {
        let registry = NodeRegistry::with_builtins();
        for tag in [
            "sleep",
            "print",
            "math",
            "intent_classifier",
            "router",
            "mock_search",
            "llm",
            "format",
        ] {
            assert!(registry.contains(tag), "missing builtin '{tag}'");
        }
    }

    #[test]
    fn unknown_type_is_an_error() {
        let registry = NodeRegistry::with_builtins();
        let err = registry.create(&spec("n1", "teleport")).unwrap_err();
        assert!(matches!(err, WorkflowError::UnknownNodeType { .. }));
    }

    #[tokio::test]
    async fn custom_registration_extends_the_catalogue() {
        #[derive(Debug)]
        struct EchoNode {
            id: String,
        }

        #[async_trait]
        impl Node for EchoNode {
            fn id(&self) -> &str {
                &self.id
            }

            async fn run(&self, inputs: Map<String, Value>) -> Result<Map<String, Value>> {
                Ok(inputs)
            }
        }

        let mut registry = NodeRegistry::with_builtins();
        registry.register("echo", |spec| {
            Arc::new(EchoNode {
                id: spec.id.clone(),
            })
        });

        let node = registry.create(&spec("e1", "echo")).unwrap();
        let mut inputs = Map::new();
        inputs.insert("k".to_string(), Value::from("v"));
        let output = node.run(inputs.clone()).await.unwrap();
        assert_eq!(output, inputs);
    }
}
