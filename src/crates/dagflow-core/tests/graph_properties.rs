//! Property-based checks over the DSL compiler and the engine's terminal
//! state: compiled graphs are acyclic, inferred dependencies cover both
//! explicit edges and template references, and a run leaves an output in
//! memory for every node.

use dagflow_core::{parse_workflow, GlobalMemory, WorkflowEngine, WorkflowGraph};
use proptest::prelude::*;
use serde_json::json;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct GenNode {
    deps: Vec<usize>,
    template_ref: Option<usize>,
    next: Vec<usize>,
}

/// Random DAG over n print nodes. Explicit deps and template refs point
/// backwards, `next` points forwards, so the generated graph is acyclic
/// by construction.
fn dag_strategy() -> impl Strategy<Value = Vec<GenNode>> {
    prop::collection::vec(any::<(u32, u32, u32)>(), 2..8).prop_map(|seeds| {
        let n = seeds.len();
        seeds
            .iter()
            .enumerate()
            .map(|(i, (dep_bits, template_seed, next_bits))| GenNode {
                deps: (0..i).filter(|j| (dep_bits >> j) & 1 == 1).collect(),
                template_ref: if i > 0 && template_seed % 3 == 0 {
                    Some((*template_seed as usize / 3) % i)
                } else {
                    None
                },
                next: (i + 1..n)
                    .filter(|j| (next_bits >> (j - i - 1)) & 1 == 1)
                    .collect(),
            })
            .collect()
    })
}

fn render_yaml(nodes: &[GenNode]) -> String {
    let mut yaml = String::from("id: generated\nnodes:\n");
    for (i, node) in nodes.iter().enumerate() {
        writeln!(yaml, "  n{i}:").unwrap();
        writeln!(yaml, "    type: print").unwrap();
        match node.template_ref {
            Some(j) => writeln!(yaml, "    inputs: {{message: \"ref {{{{ n{j}.printed }}}}\"}}").unwrap(),
            None => writeln!(yaml, "    inputs: {{message: \"plain\"}}").unwrap(),
        }
        if !node.deps.is_empty() {
            let list: Vec<String> = node.deps.iter().map(|j| format!("n{j}")).collect();
            writeln!(yaml, "    depends_on: [{}]", list.join(", ")).unwrap();
        }
        if !node.next.is_empty() {
            let list: Vec<String> = node.next.iter().map(|j| format!("n{j}")).collect();
            writeln!(yaml, "    next: [{}]", list.join(", ")).unwrap();
        }
    }
    yaml
}

/// Kahn's algorithm; `Some` iff the dependency relation is acyclic.
fn topological_order(graph: &WorkflowGraph) -> Option<Vec<String>> {
    let mut remaining: HashSet<&str> = graph.nodes.keys().map(String::as_str).collect();
    let mut order = Vec::with_capacity(remaining.len());
    while !remaining.is_empty() {
        let next: Vec<&str> = remaining
            .iter()
            .filter(|id| {
                graph
                    .dependencies(id)
                    .iter()
                    .all(|d| !remaining.contains(d.as_str()))
            })
            .copied()
            .collect();
        if next.is_empty() {
            return None;
        }
        for id in next {
            remaining.remove(id);
            order.push(id.to_string());
        }
    }
    Some(order)
}

proptest! {
    #[test]
    fn compiled_graphs_are_acyclic_and_cover_all_edges(nodes in dag_strategy()) {
        let yaml = render_yaml(&nodes);
        let graph = parse_workflow(&yaml).expect("generated document should compile");

        prop_assert!(topological_order(&graph).is_some());

        for (i, node) in nodes.iter().enumerate() {
            let id = format!("n{i}");
            let deps = graph.dependencies(&id);
            for j in &node.deps {
                prop_assert!(deps.contains(&format!("n{j}")), "explicit dep n{j} missing from {id}");
            }
            if let Some(j) = node.template_ref {
                prop_assert!(deps.contains(&format!("n{j}")), "template ref n{j} missing from {id}");
            }
            for j in &node.next {
                let downstream = graph.dependencies(&format!("n{j}"));
                prop_assert!(downstream.contains(&id), "next edge {id} -> n{j} missing");
            }
        }
    }

    #[test]
    fn every_node_of_an_unguarded_run_lands_in_memory(nodes in dag_strategy()) {
        let yaml = render_yaml(&nodes);
        let graph = parse_workflow(&yaml).expect("generated document should compile");
        let total = graph.len();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");
        let memory = Arc::new(GlobalMemory::with_inputs(json!({})));
        runtime
            .block_on(WorkflowEngine::new(Arc::new(graph), Arc::clone(&memory)).run())
            .expect("run should complete");

        for i in 0..total {
            prop_assert!(memory.get(&format!("n{i}")).is_some(), "n{i} has no output");
        }
    }
}
