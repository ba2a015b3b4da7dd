use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use ordered_float::OrderedFloat;
use tracing::{debug, warn};

use crate::closures::AncestorClosure;
use crate::error::{SemsimError, SemsimResult};
use crate::graph::OntologyGraph;
use crate::{Resnik, TermID};

pub fn calculate_jaccard_similarity<T: Eq + Hash>(set1: &HashSet<T>, set2: &HashSet<T>) -> f64 {
    /* Returns Jaccard similarity between the two sets. */
    let union_measure = set1.union(set2).count();
    if union_measure == 0 {
        return 0.0;
    }
    let intersection = set1.intersection(set2).count();
    intersection as f64 / union_measure as f64
}

/// Picks the ancestors carrying the highest information content.
/// All ancestors tied at the maximum are returned.
pub fn get_most_informative_ancestors<'a, I>(ancestors: I, ic: &[f64]) -> (HashSet<usize>, Resnik)
where
    I: IntoIterator<Item = &'a usize>,
{
    let ancestors: Vec<usize> = ancestors.into_iter().copied().collect();
    let max_ic = match ancestors.iter().map(|&a| OrderedFloat(ic[a])).max() {
        Some(OrderedFloat(max_ic)) => max_ic,
        None => return (HashSet::new(), 0.0),
    };
    let mica = ancestors
        .into_iter()
        .filter(|&a| ic[a] == max_ic)
        .collect();
    (mica, max_ic)
}

/// Information content model over an ontology DAG.
///
/// Counts are propagated upwards so that every term is credited with the
/// counts of all of its descendants, each descendant once. The frequency of
/// a term is its propagated count divided by the summed counts of all graph
/// terms, and its information content is `-ln(frequency)`. On a single-rooted
/// graph that total is the root's propagated count, so the root gets 0.
/// Terms without any count get 0.
#[derive(Debug, Clone)]
pub struct ResnikModel {
    closure: AncestorClosure,
    propagated_counts: Vec<usize>,
    information_content: Vec<f64>,
}

impl ResnikModel {
    pub fn fit(
        graph: &OntologyGraph,
        counts: &HashMap<TermID, usize>,
    ) -> SemsimResult<ResnikModel> {
        let closure = AncestorClosure::from_graph(graph)
            .ok_or_else(|| SemsimError::NotDag(graph.name().to_string()))?;

        let unknown = counts.keys().filter(|t| !graph.contains(t)).count();
        if unknown > 0 {
            debug!("{unknown} counted terms are not part of {}", graph.name());
        }

        let mut propagated_counts = vec![0usize; graph.len()];
        for (node, term) in graph.terms().iter().enumerate() {
            let count = counts.get(term).copied().unwrap_or(0);
            if count == 0 {
                continue;
            }
            for &ancestor in closure.ancestors(node) {
                propagated_counts[ancestor] += count;
            }
        }

        let total: usize = graph
            .terms()
            .iter()
            .map(|t| counts.get(t).copied().unwrap_or(0))
            .sum();
        if total == 0 && !graph.is_empty() {
            warn!(
                "none of the counted terms occur in {}; all information content is 0",
                graph.name()
            );
        }
        let information_content = propagated_counts
            .iter()
            .map(|&count| {
                if count == 0 {
                    0.0
                } else {
                    (total as f64 / count as f64).ln()
                }
            })
            .collect();

        Ok(ResnikModel {
            closure,
            propagated_counts,
            information_content,
        })
    }

    /// Uniform counts: every node counts once.
    pub fn fit_uniform(graph: &OntologyGraph) -> SemsimResult<ResnikModel> {
        let counts: HashMap<TermID, usize> =
            graph.terms().iter().map(|t| (t.clone(), 1)).collect();
        ResnikModel::fit(graph, &counts)
    }

    pub fn closure(&self) -> &AncestorClosure {
        &self.closure
    }

    pub fn information_content(&self, node: usize) -> f64 {
        self.information_content[node]
    }

    pub fn propagated_count(&self, node: usize) -> usize {
        self.propagated_counts[node]
    }

    /// Resnik similarity and the most informative common ancestors.
    pub fn resnik(&self, node1: usize, node2: usize) -> (HashSet<usize>, Resnik) {
        get_most_informative_ancestors(
            self.closure.common_ancestors(node1, node2),
            &self.information_content,
        )
    }

    pub fn resnik_score(&self, node1: usize, node2: usize) -> Resnik {
        self.closure
            .common_ancestors(node1, node2)
            .map(|&a| OrderedFloat(self.information_content[a]))
            .max()
            .map_or(0.0, |score| score.0)
    }
}
