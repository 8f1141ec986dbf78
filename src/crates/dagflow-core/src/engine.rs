//! Concurrent DAG workflow engine.
//!
//! Frontier-driven execution: each iteration partitions pending nodes by
//! dependency state, propagates skips along branches whose every upstream
//! was skipped, evaluates guards at dispatch time, and submits ready nodes
//! to a bounded worker pool. A node with upstreams in both `completed` and
//! `skipped` still runs, which is what makes first-of-N-branches joins work
//! without dedicated syntax.

use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::{Result, WorkflowError};
use crate::graph::WorkflowGraph;
use crate::memory::GlobalMemory;
use crate::node::{Node, NodeRegistry};
use crate::template;

/// Default size of the worker pool.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Backoff when nothing is in flight and nothing became ready.
const IDLE_BACKOFF: Duration = Duration::from_millis(100);

type FinishedNode = (String, Result<Map<String, Value>>);

/// Executes a compiled [`WorkflowGraph`] against a [`GlobalMemory`].
pub struct WorkflowEngine {
    graph: Arc<WorkflowGraph>,
    memory: Arc<GlobalMemory>,
    registry: Arc<NodeRegistry>,
    concurrency: usize,
}

impl WorkflowEngine {
    /// Engine over the built-in node registry with default concurrency.
    pub fn new(graph: Arc<WorkflowGraph>, memory: Arc<GlobalMemory>) -> Self {
        Self {
            graph,
            memory,
            registry: Arc::new(NodeRegistry::with_builtins()),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Replace the node registry (custom node types).
    pub fn with_registry(mut self, registry: NodeRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Bound the worker pool to `workers` (minimum 1).
    pub fn with_concurrency(mut self, workers: usize) -> Self {
        self.concurrency = workers.max(1);
        self
    }

    /// Run the workflow to completion: returns once every node is either
    /// completed or skipped. Callers read results from the memory the
    /// engine was constructed with.
    pub async fn run(&self) -> Result<()> {
        let total = self.graph.len();

        // Resolve every node implementation up front so an unknown type
        // fails the workflow before anything is dispatched.
        let mut implementations: HashMap<String, Arc<dyn Node>> = HashMap::with_capacity(total);
        for spec in self.graph.nodes.values() {
            implementations.insert(spec.id.clone(), self.registry.create(spec)?);
        }

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks: JoinSet<FinishedNode> = JoinSet::new();
        let mut completed: HashSet<String> = HashSet::new();
        let mut skipped: HashSet<String> = HashSet::new();
        let mut inflight: HashSet<String> = HashSet::new();

        while completed.len() + skipped.len() < total {
            // Partition pending nodes by dependency state.
            let mut to_skip = Vec::new();
            let mut ready = Vec::new();
            for id in self.graph.nodes.keys() {
                if completed.contains(id) || skipped.contains(id) || inflight.contains(id) {
                    continue;
                }
                let deps = self.graph.dependencies(id);
                let finished = deps
                    .iter()
                    .all(|d| completed.contains(d) || skipped.contains(d));
                if !finished {
                    continue;
                }
                if !deps.is_empty() && deps.iter().all(|d| skipped.contains(d)) {
                    to_skip.push(id.clone());
                } else {
                    ready.push(id.clone());
                }
            }

            // Skip propagation happens before any dispatch.
            if !to_skip.is_empty() {
                for id in to_skip {
                    tracing::info!(node = %id, "node skipped (all dependencies skipped)");
                    skipped.insert(id);
                }
                continue;
            }

            let mut progressed = false;
            for id in ready {
                let spec = &self.graph.nodes[&id];
                let snapshot = self.memory.snapshot();

                if let Some(condition) = &spec.condition {
                    if !template::evaluate_guard(condition, &snapshot) {
                        tracing::info!(node = %id, condition = %condition, "node skipped (condition false)");
                        skipped.insert(id);
                        progressed = true;
                        continue;
                    }
                }

                let inputs = match template::expand(&Value::Object(spec.inputs.clone()), &snapshot)
                {
                    Value::Object(fields) => fields,
                    _ => Map::new(),
                };

                tracing::info!(node = %id, node_type = %spec.node_type, "submitting node");
                let node = Arc::clone(&implementations[&id]);
                let permits = Arc::clone(&semaphore);
                inflight.insert(id.clone());
                progressed = true;
                tasks.spawn(async move {
                    let _permit = permits.acquire_owned().await.expect("semaphore closed");
                    let result = node.run(inputs).await;
                    (id, result)
                });
            }

            if tasks.is_empty() {
                if !progressed {
                    // Nothing in flight, nothing became ready or skipped:
                    // the run cannot make progress.
                    let mut pending: Vec<String> = self
                        .graph
                        .nodes
                        .keys()
                        .filter(|id| !completed.contains(*id) && !skipped.contains(*id))
                        .cloned()
                        .collect();
                    if !pending.is_empty() {
                        pending.sort();
                        return Err(WorkflowError::Deadlock { pending });
                    }
                }
                tokio::time::sleep(IDLE_BACKOFF).await;
                continue;
            }

            // Block until at least one in-flight node finishes.
            if let Some(joined) = tasks.join_next().await {
                let (id, outcome) = match joined {
                    Ok(finished) => finished,
                    Err(join_err) => {
                        self.drain(&mut tasks).await;
                        return Err(WorkflowError::node_execution(
                            "unknown",
                            format!("node task aborted: {join_err}"),
                        ));
                    }
                };
                inflight.remove(&id);
                match outcome {
                    Ok(output) => {
                        self.memory.set(&id, Value::Object(output));
                        tracing::info!(node = %id, "node completed");
                        completed.insert(id);
                    }
                    Err(err) => {
                        tracing::error!(node = %id, error = %err, "node failed, aborting workflow");
                        self.drain(&mut tasks).await;
                        return Err(WorkflowError::node_execution(id, err));
                    }
                }
            }
        }

        tracing::info!(
            workflow = %self.graph.workflow_id,
            completed = completed.len(),
            skipped = skipped.len(),
            "workflow execution completed"
        );
        Ok(())
    }

    /// Let already-submitted nodes finish after an abort. No further nodes
    /// are dispatched; successful outputs are still recorded.
    async fn drain(&self, tasks: &mut JoinSet<FinishedNode>) {
        while let Some(joined) = tasks.join_next().await {
            if let Ok((id, Ok(output))) = joined {
                self.memory.set(&id, Value::Object(output));
                tracing::info!(node = %id, "in-flight node drained after abort");
            }
        }
    }
}
