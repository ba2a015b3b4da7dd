use std::collections::{BTreeMap, HashMap, HashSet};

use ordered_float::OrderedFloat;
use rayon::prelude::*;
use tracing::{info, warn};

pub mod ancestors;
pub mod closures;
pub mod config;
pub mod db_query;
pub mod enums;
pub mod error;
pub mod fetch;
pub mod file_io;
pub mod graph;
pub mod phenodigm;
pub mod process_ontology;
pub mod similarity;
pub mod structs;
pub mod utils;


use ancestors::BreadthFirstSearch;
use error::{SemsimError, SemsimResult};
use graph::OntologyGraph;
use similarity::ResnikModel;
use structs::SimilarityRow;
use utils::generate_progress_bar_of_length_and_message;

pub use error::SemsimError as Error;

pub type Predicate = String;
pub type TermID = String;
pub type Jaccard = f64;
pub type Resnik = f64;
pub type MostInformativeAncestors = HashSet<TermID>;
pub type SubsetSimilarities = BTreeMap<(TermID, TermID), (Resnik, Jaccard)>;

/// Fitted similarity model over one normalised ontology graph.
pub struct Semsim {
    graph: OntologyGraph,
    resnik: ResnikModel,
    searches: Vec<BreadthFirstSearch>,
}

impl Semsim {
    /// Fits the information content model from `counts` and runs one
    /// breadth-first search per root. With `root_node` only that node is
    /// used as root for Jaccard scores.
    pub fn new(
        graph: OntologyGraph,
        counts: &HashMap<TermID, usize>,
        root_node: Option<&str>,
    ) -> SemsimResult<Semsim> {
        let resnik = ResnikModel::fit(&graph, counts)?;

        let roots = match root_node {
            Some(name) => {
                let root = graph
                    .node_id(name)
                    .ok_or_else(|| SemsimError::UnknownTerm(name.to_string()))?;
                info!("Will use single root as specified: {name}");
                vec![root]
            }
            None => {
                let roots = graph.roots();
                match roots.as_slice() {
                    [root] => info!("Found single root: {}", graph.term(*root)),
                    _ => info!("Found multiple roots: {:?}", graph.root_names()),
                }
                roots
            }
        };
        let searches = roots
            .into_iter()
            .map(|root| BreadthFirstSearch::from_root(&graph, root))
            .collect();

        Ok(Semsim {
            graph,
            resnik,
            searches,
        })
    }

    pub fn graph(&self) -> &OntologyGraph {
        &self.graph
    }

    pub fn resnik_model(&self) -> &ResnikModel {
        &self.resnik
    }

    pub fn root_names(&self) -> Vec<&str> {
        self.searches
            .iter()
            .map(|bfs| self.graph.term(bfs.root()))
            .collect()
    }

    fn node(&self, term: &str) -> SemsimResult<usize> {
        self.graph
            .node_id(term)
            .ok_or_else(|| SemsimError::UnknownTerm(term.to_string()))
    }

    /// Ancestor Jaccard, maximised over the roots in use.
    fn jaccard_by_node(&self, node1: usize, node2: usize) -> Jaccard {
        self.searches
            .iter()
            .map(|bfs| OrderedFloat(bfs.ancestors_jaccard(node1, node2)))
            .max()
            .map_or(0.0, |j| j.0)
    }

    pub fn jaccard_similarity(&self, term1: &str, term2: &str) -> SemsimResult<Jaccard> {
        Ok(self.jaccard_by_node(self.node(term1)?, self.node(term2)?))
    }

    pub fn resnik_similarity(
        &self,
        term1: &str,
        term2: &str,
    ) -> SemsimResult<(MostInformativeAncestors, Resnik)> {
        let (mica, score) = self.resnik.resnik(self.node(term1)?, self.node(term2)?);
        let mica = mica
            .into_iter()
            .map(|n| self.graph.term(n).to_string())
            .collect();
        Ok((mica, score))
    }

    /// Scores every unordered pair, self-pairs included, of the terms
    /// carrying one of `prefixes`, keeping pairs with a Resnik score of at
    /// least `cutoff`. Rows come back sorted by Resnik score, highest first.
    pub fn all_by_all_pairwise_similarity(
        &self,
        prefixes: &[String],
        cutoff: Resnik,
    ) -> Vec<SimilarityRow> {
        let focus = self.graph.nodes_with_prefixes(prefixes);
        info!(
            "Calculating Resnik and Jaccard scores for {} terms with prefixes {}...",
            focus.len(),
            prefixes.join(", ")
        );

        let progress_bar = generate_progress_bar_of_length_and_message(
            focus.len() as u64,
            "Computing pairwise similarities:",
        );

        let mut rows: Vec<SimilarityRow> = focus
            .par_iter()
            .enumerate()
            .flat_map_iter(|(i, &source)| {
                let rows: Vec<SimilarityRow> = focus[i..]
                    .iter()
                    .filter_map(|&destination| {
                        let score = self.resnik.resnik_score(source, destination);
                        if score < cutoff {
                            return None;
                        }
                        let (mica, _) = self.resnik.resnik(source, destination);
                        let mut mica: Vec<TermID> = mica
                            .into_iter()
                            .map(|n| self.graph.term(n).to_string())
                            .collect();
                        mica.sort();
                        Some(SimilarityRow {
                            source: self.graph.term(source).to_string(),
                            destination: self.graph.term(destination).to_string(),
                            resnik_score: score,
                            jaccard_score: self.jaccard_by_node(source, destination),
                            mica,
                        })
                    })
                    .collect();
                progress_bar.inc(1);
                rows
            })
            .collect();
        progress_bar.finish();

        rows.sort_by(|a, b| {
            OrderedFloat(b.resnik_score)
                .cmp(&OrderedFloat(a.resnik_score))
                .then_with(|| a.source.cmp(&b.source))
                .then_with(|| a.destination.cmp(&b.destination))
        });
        rows
    }

    /// Scores every 2-combination of `terms`, in input order. Jaccard uses
    /// the first root only. Terms missing from the graph score `(0.0, 0.0)`.
    pub fn subset_similarity(&self, terms: &[TermID]) -> SubsetSimilarities {
        info!("Calculating Resnik and Jaccard scores for {} nodes...", terms.len());
        for term in terms.iter().filter(|t| !self.graph.contains(t)) {
            warn!("{term} is not in {}; its scores will be 0", self.graph.name());
        }

        let first_root = self.searches.first();
        let mut similarities = SubsetSimilarities::new();
        for (i, term1) in terms.iter().enumerate() {
            for term2 in terms[i + 1..].iter() {
                let scores = match (self.graph.node_id(term1), self.graph.node_id(term2)) {
                    (Some(node1), Some(node2)) => (
                        self.resnik.resnik_score(node1, node2),
                        first_root.map_or(0.0, |bfs| bfs.ancestors_jaccard(node1, node2)),
                    ),
                    _ => (0.0, 0.0),
                };
                similarities.insert((term1.clone(), term2.clone()), scores);
            }
        }
        similarities
    }
}
