use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use tracing::{debug, info, warn};

use crate::error::{SemsimError, SemsimResult};
use crate::utils::with_separator;
use crate::{Predicate, TermID};

/// Ontology as it comes off disk: node ids plus `(subject, predicate, object)`
/// triples in KGX orientation, i.e. `child subclass_of parent`.
#[derive(Debug, Clone, Default)]
pub struct RawGraph {
    pub name: String,
    pub nodes: Vec<TermID>,
    pub spo: Vec<(TermID, Predicate, TermID)>,
}

impl RawGraph {
    pub fn new(name: &str, nodes: Vec<TermID>, spo: Vec<(TermID, Predicate, TermID)>) -> RawGraph {
        RawGraph {
            name: name.to_uppercase(),
            nodes,
            spo,
        }
    }

    /// Filters to `predicate` and `prefixes`, transposes the edges so they run
    /// parent -> child, drops nodes left without edges and checks the result
    /// is a DAG. A graph split into several components is reduced to the
    /// largest one.
    pub fn normalize(&self, predicate: &str, prefixes: &[String]) -> SemsimResult<OntologyGraph> {
        let prefixes: Vec<String> = prefixes.iter().map(|p| with_separator(p)).collect();
        let keep_prefix = |term: &str| -> bool {
            prefixes.is_empty() || prefixes.iter().any(|p| term.starts_with(p.as_str()))
        };
        let known: HashSet<&str> = self.nodes.iter().map(|n| n.as_str()).collect();
        let keep_node = |term: &str| -> bool {
            (known.is_empty() || known.contains(term)) && keep_prefix(term)
        };

        let mut dropped = 0usize;
        let edges: Vec<(TermID, TermID)> = self
            .spo
            .iter()
            .filter(|(_, p, _)| p == predicate)
            .filter_map(|(s, _, o)| {
                if keep_node(s) && keep_node(o) {
                    // transpose: subject subclass_of object becomes object -> subject
                    Some((o.clone(), s.clone()))
                } else {
                    dropped += 1;
                    None
                }
            })
            .collect();
        debug!(
            "{}: {} edges kept for {}, {} dropped by node filters",
            self.name,
            edges.len(),
            predicate,
            dropped
        );

        let graph = OntologyGraph::from_edges(&self.name, edges);
        info!(
            "{} filtered to {} nodes and {} edges",
            graph.name(),
            graph.len(),
            graph.edge_count()
        );

        if graph.topological_order().is_none() {
            let loops = graph.self_loop_count();
            if loops > 0 {
                return Err(SemsimError::SelfLoops {
                    name: graph.name().to_string(),
                    loops,
                });
            }
            return Err(SemsimError::NotDag(graph.name().to_string()));
        }

        let mut components = graph.weakly_connected_components();
        if components.len() > 1 {
            components.sort_by_key(|c| std::cmp::Reverse(c.len()));
            warn!(
                "{} has {} disconnected components; keeping the largest ({} of {} nodes)",
                graph.name(),
                components.len(),
                components[0].len(),
                graph.len()
            );
            let keep: HashSet<usize> = components[0].iter().copied().collect();
            return Ok(graph.subgraph(&keep));
        }

        Ok(graph)
    }
}

/// Directed ontology graph with edges running from parent to child.
///
/// Nodes live in an arena sorted by term id, so node indices and every
/// iteration order derived from them are stable between runs.
#[derive(Debug, Clone, Default)]
pub struct OntologyGraph {
    name: String,
    terms: Vec<TermID>,
    index: HashMap<TermID, usize>,
    children: Vec<Vec<usize>>,
    parents: Vec<Vec<usize>>,
}

impl OntologyGraph {
    /// Builds a graph from `(parent, child)` pairs. Duplicate edges collapse;
    /// self-loops are kept so that they can be reported.
    pub fn from_edges<I>(name: &str, edges: I) -> OntologyGraph
    where
        I: IntoIterator<Item = (TermID, TermID)>,
    {
        let edges: BTreeSet<(TermID, TermID)> = edges.into_iter().collect();
        let terms: Vec<TermID> = edges
            .iter()
            .flat_map(|(p, c)| [p.clone(), c.clone()])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let index: HashMap<TermID, usize> = terms
            .iter()
            .enumerate()
            .map(|(idx, term)| (term.clone(), idx))
            .collect();

        let mut children = vec![Vec::new(); terms.len()];
        let mut parents = vec![Vec::new(); terms.len()];
        for (parent, child) in edges.iter() {
            let p = index[parent];
            let c = index[child];
            children[p].push(c);
            parents[c].push(p);
        }
        for adjacency in children.iter_mut().chain(parents.iter_mut()) {
            adjacency.sort_unstable();
        }

        OntologyGraph {
            name: name.to_string(),
            terms,
            index,
            children,
            parents,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.children.iter().map(|c| c.len()).sum()
    }

    pub fn terms(&self) -> &[TermID] {
        &self.terms
    }

    pub fn term(&self, node: usize) -> &str {
        &self.terms[node]
    }

    pub fn node_id(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.index.contains_key(term)
    }

    pub fn children(&self, node: usize) -> &[usize] {
        &self.children[node]
    }

    pub fn parents(&self, node: usize) -> &[usize] {
        &self.parents[node]
    }

    /// Nodes without parents.
    pub fn roots(&self) -> Vec<usize> {
        (0..self.len())
            .filter(|&n| self.parents[n].is_empty())
            .collect()
    }

    pub fn root_names(&self) -> Vec<&str> {
        self.roots().into_iter().map(|n| self.term(n)).collect()
    }

    /// Nodes whose id starts with `<prefix>:` for any of `prefixes`.
    pub fn nodes_with_prefixes(&self, prefixes: &[String]) -> Vec<usize> {
        let prefixes: Vec<String> = prefixes.iter().map(|p| with_separator(p)).collect();
        (0..self.len())
            .filter(|&n| prefixes.iter().any(|p| self.terms[n].starts_with(p.as_str())))
            .collect()
    }

    pub fn self_loop_count(&self) -> usize {
        (0..self.len())
            .filter(|&n| self.children[n].binary_search(&n).is_ok())
            .count()
    }

    /// Kahn's algorithm; `None` when the graph has a cycle.
    pub fn topological_order(&self) -> Option<Vec<usize>> {
        let mut in_degree: Vec<usize> = self.parents.iter().map(|p| p.len()).collect();
        let mut queue: VecDeque<usize> = (0..self.len()).filter(|&n| in_degree[n] == 0).collect();
        let mut order = Vec::with_capacity(self.len());

        while let Some(node) = queue.pop_front() {
            order.push(node);
            for &child in &self.children[node] {
                in_degree[child] -= 1;
                if in_degree[child] == 0 {
                    queue.push_back(child);
                }
            }
        }

        if order.len() == self.len() {
            Some(order)
        } else {
            None
        }
    }

    pub fn is_dag(&self) -> bool {
        self.topological_order().is_some()
    }

    /// Components ignoring edge direction, each sorted by node index.
    pub fn weakly_connected_components(&self) -> Vec<Vec<usize>> {
        let mut seen = vec![false; self.len()];
        let mut components = Vec::new();

        for start in 0..self.len() {
            if seen[start] {
                continue;
            }
            seen[start] = true;
            let mut component = vec![start];
            let mut stack = vec![start];
            while let Some(node) = stack.pop() {
                for &next in self.children[node].iter().chain(self.parents[node].iter()) {
                    if !seen[next] {
                        seen[next] = true;
                        component.push(next);
                        stack.push(next);
                    }
                }
            }
            component.sort_unstable();
            components.push(component);
        }
        components
    }

    /// Induced subgraph over `keep`.
    pub fn subgraph(&self, keep: &HashSet<usize>) -> OntologyGraph {
        let edges = keep.iter().flat_map(|&parent| {
            self.children[parent]
                .iter()
                .filter(|child| keep.contains(child))
                .map(move |&child| (self.terms[parent].clone(), self.terms[child].clone()))
        });
        OntologyGraph::from_edges(&self.name, edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_constants::{SPO_HPO, SPO_HPO_TWO_COMPONENTS};

    fn subclass_of() -> String {
        "biolink:subclass_of".to_string()
    }

    #[test]
    fn test_normalize_transposes_edges() {
        let raw = RawGraph::new("hp", vec![], SPO_HPO.clone());
        let graph = raw.normalize(&subclass_of(), &["HP".to_string()]).unwrap();

        assert_eq!(graph.name(), "HP");
        assert_eq!(graph.root_names(), vec!["HP:0000001"]);
        let all = graph.node_id("HP:0000001").unwrap();
        let abnormality = graph.node_id("HP:0000118").unwrap();
        assert!(graph.children(all).contains(&abnormality));
        assert!(graph.parents(abnormality).contains(&all));
        assert!(graph.is_dag());
    }

    #[test]
    fn test_normalize_filters_predicate_and_prefix() {
        let mut spo = SPO_HPO.clone();
        spo.push((
            "HP:0001507".to_string(),
            "biolink:related_to".to_string(),
            "HP:0000707".to_string(),
        ));
        spo.push((
            "UPHENO:0000001".to_string(),
            subclass_of(),
            "HP:0000001".to_string(),
        ));
        let graph = RawGraph::new("hp", vec![], spo)
            .normalize(&subclass_of(), &["HP".to_string()])
            .unwrap();

        assert!(!graph.contains("UPHENO:0000001"));
        let growth = graph.node_id("HP:0001507").unwrap();
        let nervous = graph.node_id("HP:0000707").unwrap();
        assert!(!graph.children(nervous).contains(&growth));
    }

    #[test]
    fn test_normalize_drops_nodes_outside_node_list() {
        let nodes: Vec<TermID> = SPO_HPO
            .iter()
            .flat_map(|(s, _, o)| [s.clone(), o.clone()])
            .filter(|t| t != "HP:0000152")
            .collect();
        let graph = RawGraph::new("hp", nodes, SPO_HPO.clone())
            .normalize(&subclass_of(), &[])
            .unwrap();

        assert!(!graph.contains("HP:0000152"));
        assert!(graph.contains("HP:0000118"));
    }

    #[test]
    fn test_normalize_rejects_cycles() {
        let spo = vec![
            ("HP:1".to_string(), subclass_of(), "HP:2".to_string()),
            ("HP:2".to_string(), subclass_of(), "HP:3".to_string()),
            ("HP:3".to_string(), subclass_of(), "HP:1".to_string()),
        ];
        let result = RawGraph::new("hp", vec![], spo).normalize(&subclass_of(), &[]);
        assert!(matches!(result, Err(SemsimError::NotDag(_))));
    }

    #[test]
    fn test_normalize_reports_self_loops() {
        let spo = vec![
            ("HP:1".to_string(), subclass_of(), "HP:2".to_string()),
            ("HP:2".to_string(), subclass_of(), "HP:2".to_string()),
        ];
        let result = RawGraph::new("hp", vec![], spo).normalize(&subclass_of(), &[]);
        match result {
            Err(SemsimError::SelfLoops { loops, .. }) => assert_eq!(loops, 1),
            other => panic!("expected self-loop error, got {other:?}"),
        }
    }

    #[test]
    fn test_normalize_keeps_largest_component() {
        let graph = RawGraph::new("hp", vec![], SPO_HPO_TWO_COMPONENTS.clone())
            .normalize(&subclass_of(), &[])
            .unwrap();

        assert_eq!(graph.weakly_connected_components().len(), 1);
        assert!(graph.contains("HP:0000118"));
        assert!(!graph.contains("HP:9999999"));
        assert!(!graph.contains("HP:9999998"));
    }

    #[test]
    fn test_topological_order_puts_parents_first() {
        let graph = RawGraph::new("hp", vec![], SPO_HPO.clone())
            .normalize(&subclass_of(), &[])
            .unwrap();
        let order = graph.topological_order().unwrap();
        let position: HashMap<usize, usize> =
            order.iter().enumerate().map(|(i, &n)| (n, i)).collect();

        for node in 0..graph.len() {
            for &child in graph.children(node) {
                assert!(position[&node] < position[&child]);
            }
        }
    }

    #[test]
    fn test_nodes_with_prefixes() {
        let graph = OntologyGraph::from_edges(
            "mixed",
            vec![
                ("UPHENO:1".to_string(), "HP:1".to_string()),
                ("UPHENO:1".to_string(), "MP:1".to_string()),
                ("UPHENO:1".to_string(), "HPX:1".to_string()),
            ],
        );
        let hp = graph.nodes_with_prefixes(&["HP".to_string()]);
        assert_eq!(hp.len(), 1);
        assert_eq!(graph.term(hp[0]), "HP:1");
        assert_eq!(
            graph
                .nodes_with_prefixes(&["HP".to_string(), "MP:".to_string()])
                .len(),
            2
        );
    }
}
