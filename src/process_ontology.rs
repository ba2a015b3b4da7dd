//! End-to-end runs: fetch an ontology, normalise it, fit the model and
//! write or return the similarities.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::config::{CountsSource, OntologyConfig, SimConfig, SubsetConfig};
use crate::db_query::load_semsql_graph;
use crate::enums::{KnownOntology, OntologySource};
use crate::error::{SemsimError, SemsimResult};
use crate::fetch::{download_to, fetch_annotation_counts, load_local_graph};
use crate::file_io::{read_annotation_counts, read_kgx_tables, write_similarity_tables};
use crate::graph::{OntologyGraph, RawGraph};
use crate::{Semsim, SubsetSimilarities, TermID};

/// Reads the ontology from wherever `config.source` points.
pub fn load_ontology(config: &OntologyConfig) -> SemsimResult<RawGraph> {
    let name = config.ontology.as_str();
    match &config.source {
        OntologySource::Registry { version } => {
            let ontology = KnownOntology::from_string(name)?;
            let destination = config
                .cache_dir
                .join(name.to_lowercase())
                .join(version)
                .join(ontology.archive_name());
            let archive = download_to(&ontology.kgobo_url(version), &destination)?;
            load_local_graph(name, &archive)
        }
        OntologySource::Archive(path) => load_local_graph(name, path),
        OntologySource::Tables { nodes, edges } => read_kgx_tables(name, nodes, edges),
        OntologySource::SemSql(path) => load_semsql_graph(name, path, &config.predicate),
    }
}

/// Loads and normalises the ontology, keeping nodes with `prefixes`.
pub fn get_ontology_graph(
    config: &OntologyConfig,
    prefixes: &[String],
) -> SemsimResult<OntologyGraph> {
    info!("Input graph is {}.", config.ontology);
    info!("Filtering to {}.", config.predicate);
    load_ontology(config)?.normalize(&config.predicate, prefixes)
}

pub fn get_counts(
    source: &CountsSource,
    graph: &OntologyGraph,
) -> SemsimResult<HashMap<TermID, usize>> {
    match source {
        CountsSource::Uniform => Ok(graph.terms().iter().map(|t| (t.clone(), 1)).collect()),
        CountsSource::File { path, column } => read_annotation_counts(path, column),
        CountsSource::Remote { url, column } => fetch_annotation_counts(url, column),
    }
}

/// Computes the all-pairs table and writes `<NAME>_resnik` and
/// `<NAME>_jaccard` to `output_dir`.
pub fn compute_pairwise_sims(
    semsim: &Semsim,
    prefixes: &[String],
    cutoff: f64,
    output_dir: &Path,
) -> SemsimResult<(PathBuf, PathBuf)> {
    let name = semsim.graph().name().to_string();
    let rows = semsim.all_by_all_pairwise_similarity(prefixes, cutoff);
    if rows.is_empty() {
        return Err(SemsimError::EmptyResult(name));
    }
    info!("Writing {} rows to {}...", rows.len(), output_dir.display());
    write_similarity_tables(&rows, output_dir, &name)
}

/// Runs `sim`. Loading errors are returned; a failure while computing or
/// writing the tables is logged and reported as `Ok(false)`.
pub fn get_similarities(config: &SimConfig) -> SemsimResult<bool> {
    let graph = get_ontology_graph(&config.ontology, &config.prefixes)?;
    let counts = get_counts(&config.counts, &graph)?;
    let semsim = Semsim::new(graph, &counts, config.root_node.as_deref())?;

    match compute_pairwise_sims(&semsim, &config.prefixes, config.cutoff, &config.output_dir) {
        Ok((resnik_path, jaccard_path)) => {
            info!(
                "Wrote {} and {}.",
                resnik_path.display(),
                jaccard_path.display()
            );
            Ok(true)
        }
        Err(e) => {
            error!(
                "Semantic similarity calculation failed for {}: {e}",
                config.ontology.ontology
            );
            Ok(false)
        }
    }
}

/// Runs `somesim`: similarities for every pair of the given participants.
pub fn get_subset_similarities(config: &SubsetConfig) -> SemsimResult<SubsetSimilarities> {
    let graph = get_ontology_graph(&config.ontology, &config.prefixes())?;
    let counts = get_counts(&config.counts, &graph)?;
    let semsim = Semsim::new(graph, &counts, None)?;
    Ok(semsim.subset_similarity(&config.participants))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PREDICATE;
    use crate::test_utils::test_constants::SPO_HPO;
    use std::fs::File;
    use std::io::Write;

    fn write_tables(dir: &Path) -> (PathBuf, PathBuf) {
        let nodes = dir.join("hp_nodes.tsv");
        let edges = dir.join("hp_edges.tsv");
        let mut f = File::create(&nodes).unwrap();
        writeln!(f, "id\tcategory").unwrap();
        let mut e = File::create(&edges).unwrap();
        writeln!(e, "subject\tpredicate\tobject").unwrap();
        for (s, p, o) in SPO_HPO.iter() {
            writeln!(e, "{s}\t{p}\t{o}").unwrap();
        }
        (nodes, edges)
    }

    #[test]
    fn test_get_counts_uniform() {
        let graph = OntologyGraph::from_edges("t", vec![("A:1".to_string(), "A:2".to_string())]);
        let counts = get_counts(&CountsSource::Uniform, &graph).unwrap();
        assert_eq!(counts.len(), 2);
        assert!(counts.values().all(|&c| c == 1));
    }

    #[test]
    fn test_get_similarities_reports_empty_result_as_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (nodes, edges) = write_tables(dir.path());
        let ontology = OntologyConfig::new(
            "hp",
            DEFAULT_PREDICATE,
            OntologySource::Tables { nodes, edges },
            dir.path().to_path_buf(),
        );
        // nothing reaches a cutoff this high
        let config = SimConfig::new(
            ontology,
            100.0,
            dir.path().join("out"),
            CountsSource::Uniform,
            vec![],
            None,
        )
        .unwrap();

        assert!(!get_similarities(&config).unwrap());
        assert!(!dir.path().join("out").join("HP_resnik").exists());
    }

    #[test]
    fn test_get_similarities_propagates_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let ontology = OntologyConfig::new(
            "hp",
            DEFAULT_PREDICATE,
            OntologySource::Archive(dir.path().join("missing.tar.gz")),
            dir.path().to_path_buf(),
        );
        let config = SimConfig::new(
            ontology,
            2.5,
            dir.path().to_path_buf(),
            CountsSource::Uniform,
            vec![],
            None,
        )
        .unwrap();
        assert!(matches!(
            get_similarities(&config),
            Err(SemsimError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_registry_rejects_unknown_name() {
        let dir = tempfile::tempdir().unwrap();
        let ontology = OntologyConfig::new(
            "notanontology",
            DEFAULT_PREDICATE,
            OntologySource::default(),
            dir.path().to_path_buf(),
        );
        assert!(matches!(
            load_ontology(&ontology),
            Err(SemsimError::UnknownOntology(_))
        ));
    }
}
