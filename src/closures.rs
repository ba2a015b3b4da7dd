use std::collections::HashSet;

use crate::graph::OntologyGraph;

/// Reflexive ancestor closure of every node of a DAG.
#[derive(Debug, Clone, Default)]
pub struct AncestorClosure {
    ancestors: Vec<HashSet<usize>>,
}

impl AncestorClosure {
    /// Walks the graph in topological order so each node only has to merge
    /// the already complete closures of its parents. Returns `None` for a
    /// graph with a cycle.
    pub fn from_graph(graph: &OntologyGraph) -> Option<AncestorClosure> {
        let order = graph.topological_order()?;
        let mut ancestors: Vec<HashSet<usize>> = vec![HashSet::new(); graph.len()];

        for node in order {
            let mut closure = HashSet::from([node]);
            for &parent in graph.parents(node) {
                closure.extend(ancestors[parent].iter().copied());
            }
            ancestors[node] = closure;
        }

        Some(AncestorClosure { ancestors })
    }

    pub fn ancestors(&self, node: usize) -> &HashSet<usize> {
        &self.ancestors[node]
    }

    pub fn len(&self) -> usize {
        self.ancestors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ancestors.is_empty()
    }

    /// Ancestors shared by both nodes, iterating over the smaller closure.
    pub fn common_ancestors(&self, node1: usize, node2: usize) -> impl Iterator<Item = &usize> {
        let (small, large) = if self.ancestors[node1].len() <= self.ancestors[node2].len() {
            (&self.ancestors[node1], &self.ancestors[node2])
        } else {
            (&self.ancestors[node2], &self.ancestors[node1])
        };
        small.iter().filter(move |a| large.contains(a))
    }
}
