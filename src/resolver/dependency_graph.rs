//! Dependency ordering for resolved modules.
//!
//! Modules are placed in a petgraph [`DiGraph`] with an edge from each module to every
//! module it requires. A post-order walk started from each module in resolution order
//! yields dependencies before dependents, and otherwise keeps resolution order, so the
//! generated files are stable between runs.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::DfsPostOrder;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::core::Artifact;

/// Order `artifacts` so every module comes after the modules it requires.
///
/// Requirements outside the set are ignored. When the requirements form a cycle the
/// input order is returned unchanged.
#[must_use]
pub fn order_by_requirements(artifacts: &[Arc<Artifact>]) -> Vec<Arc<Artifact>> {
    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let mut index: HashMap<&str, NodeIndex> = HashMap::new();

    for (position, artifact) in artifacts.iter().enumerate() {
        let node = graph.add_node(position);
        index.entry(artifact.name.as_str()).or_insert(node);
    }

    for (position, artifact) in artifacts.iter().enumerate() {
        let from = NodeIndex::new(position);
        for requirement in artifact.requires() {
            if let Some(&to) = index.get(requirement.as_str()) {
                if from != to {
                    graph.add_edge(from, to, ());
                }
            }
        }
    }

    if let Err(cycle) = toposort(&graph, None) {
        let at = &artifacts[graph[cycle.node_id()]].name;
        debug!("Module requirements form a cycle through '{}', keeping resolution order", at);
        return artifacts.to_vec();
    }

    let mut order = Vec::with_capacity(artifacts.len());
    let mut dfs = DfsPostOrder::empty(&graph);
    for start in graph.node_indices() {
        dfs.move_to(start);
        while let Some(node) = dfs.next(&graph) {
            order.push(Arc::clone(&artifacts[graph[node]]));
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::test_support::module;

    fn names(artifacts: &[Arc<Artifact>]) -> Vec<&str> {
        artifacts.iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn test_dependencies_first() {
        let artifacts = vec![module("A", &["B"], &[]), module("B", &["C"], &[]), module("C", &[], &[])];
        assert_eq!(names(&order_by_requirements(&artifacts)), vec!["C", "B", "A"]);
    }

    #[test]
    fn test_independent_modules_keep_order() {
        let artifacts = vec![module("x", &[], &[]), module("y", &[], &[]), module("z", &[], &[])];
        assert_eq!(names(&order_by_requirements(&artifacts)), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_requirements_in_declared_order() {
        let artifacts = vec![
            module("app", &["ui", "data"], &[]),
            module("ui", &[], &[]),
            module("data", &[], &[]),
        ];
        assert_eq!(names(&order_by_requirements(&artifacts)), vec!["ui", "data", "app"]);
    }

    #[test]
    fn test_cycle_keeps_input_order() {
        let artifacts = vec![module("A", &["B"], &[]), module("B", &["A"], &[])];
        assert_eq!(names(&order_by_requirements(&artifacts)), vec!["A", "B"]);
    }

    #[test]
    fn test_outside_requirements_ignored() {
        let artifacts = vec![module("A", &["ghost"], &[])];
        assert_eq!(names(&order_by_requirements(&artifacts)), vec!["A"]);
    }
}
