use std::collections::{HashSet, VecDeque};

use crate::graph::OntologyGraph;
use crate::similarity::calculate_jaccard_similarity;

/// Breadth-first search from a single root, keeping the predecessor of every
/// reached node. Following predecessors from a node back to the root gives
/// one shortest path, which is the ancestor set used for Jaccard scores.
#[derive(Debug, Clone)]
pub struct BreadthFirstSearch {
    root: usize,
    predecessors: Vec<Option<usize>>,
    distances: Vec<Option<usize>>,
}

impl BreadthFirstSearch {
    pub fn from_root(graph: &OntologyGraph, root: usize) -> BreadthFirstSearch {
        let mut predecessors = vec![None; graph.len()];
        let mut distances = vec![None; graph.len()];
        let mut queue = VecDeque::from([root]);
        distances[root] = Some(0);

        while let Some(node) = queue.pop_front() {
            let next_distance = distances[node].map(|d| d + 1);
            for &child in graph.children(node) {
                if distances[child].is_none() {
                    distances[child] = next_distance;
                    predecessors[child] = Some(node);
                    queue.push_back(child);
                }
            }
        }

        BreadthFirstSearch {
            root,
            predecessors,
            distances,
        }
    }

    pub fn root(&self) -> usize {
        self.root
    }

    pub fn reaches(&self, node: usize) -> bool {
        self.distances.get(node).map_or(false, |d| d.is_some())
    }

    pub fn distance(&self, node: usize) -> Option<usize> {
        self.distances.get(node).copied().flatten()
    }

    pub fn predecessor(&self, node: usize) -> Option<usize> {
        self.predecessors.get(node).copied().flatten()
    }

    /// `node`, its predecessor, ..., the root. Empty when `node` is unreachable.
    pub fn ancestor_path(&self, node: usize) -> Vec<usize> {
        if !self.reaches(node) {
            return Vec::new();
        }
        let mut path = vec![node];
        let mut current = node;
        while let Some(previous) = self.predecessor(current) {
            path.push(previous);
            current = previous;
        }
        path
    }

    pub fn ancestor_set(&self, node: usize) -> HashSet<usize> {
        self.ancestor_path(node).into_iter().collect()
    }

    pub fn ancestors_jaccard(&self, node1: usize, node2: usize) -> f64 {
        calculate_jaccard_similarity(&self.ancestor_set(node1), &self.ancestor_set(node2))
    }
}
