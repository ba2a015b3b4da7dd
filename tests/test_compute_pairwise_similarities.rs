use std::fs;
use std::path::{Path, PathBuf};

use semsim::config::{CountsSource, OntologyConfig, SimConfig, SubsetConfig, DEFAULT_PREDICATE};
use semsim::enums::OntologySource;
use semsim::error::SemsimError;
use semsim::process_ontology::{get_ontology_graph, get_similarities, get_subset_similarities};
use semsim::structs::{JaccardRow, ResnikRow};

fn hpo_tables() -> OntologySource {
    OntologySource::Tables {
        nodes: PathBuf::from("tests/resources/test_hpo_nodes.tsv"),
        edges: PathBuf::from("tests/resources/test_hpo_edges.tsv"),
    }
}

fn hp_config(cache_dir: &Path) -> OntologyConfig {
    OntologyConfig::new("HP", DEFAULT_PREDICATE, hpo_tables(), cache_dir.to_path_buf())
}

fn read_rows<T: serde::de::DeserializeOwned>(path: &Path) -> Vec<T> {
    csv::Reader::from_path(path)
        .unwrap()
        .deserialize()
        .map(|r| r.unwrap())
        .collect()
}

#[test]
fn test_get_ontology_graph_filters_prefix_and_predicate() {
    let dir = tempfile::tempdir().unwrap();
    let graph = get_ontology_graph(&hp_config(dir.path()), &["HP".to_string()]).unwrap();

    assert_eq!(graph.len(), 33);
    assert_eq!(graph.edge_count(), 33);
    assert_eq!(graph.root_names(), vec!["HP:0000001"]);
    assert!(!graph.contains("MP:0004731"));
}

#[test]
fn test_get_similarities_writes_tables() {
    let dir = tempfile::tempdir().unwrap();
    let output_dir = dir.path().join("data");
    let config = SimConfig::new(
        hp_config(dir.path()),
        2.5,
        output_dir.clone(),
        CountsSource::Uniform,
        vec![],
        None,
    )
    .unwrap();

    assert!(get_similarities(&config).unwrap());

    let resnik_path = output_dir.join("HP_resnik");
    let jaccard_path = output_dir.join("HP_jaccard");
    assert!(resnik_path.exists());
    assert!(jaccard_path.exists());

    let header = fs::read_to_string(&resnik_path).unwrap();
    assert!(header.starts_with("source,destination,resnik_score,mica\n"));

    let resnik: Vec<ResnikRow> = read_rows(&resnik_path);
    let jaccard: Vec<JaccardRow> = read_rows(&jaccard_path);
    assert!(!resnik.is_empty());
    assert_eq!(resnik.len(), jaccard.len());
    assert!(resnik.iter().all(|r| r.resnik_score >= 2.5));
    assert!(resnik.iter().all(|r| r.source.starts_with("HP:") && r.destination.starts_with("HP:")));

    // HP:0000504 and its only parent share the 2-term subtree below HP:0012373
    let row = resnik
        .iter()
        .find(|r| {
            r.source == "HP:0000504" && r.destination == "HP:0012373"
                || r.source == "HP:0012373" && r.destination == "HP:0000504"
        })
        .unwrap();
    assert!((row.resnik_score - 16.5_f64.ln()).abs() < 1e-9);
    assert_eq!(row.mica, "HP:0012373");
}

#[test]
fn test_get_similarities_with_annotation_file() {
    let dir = tempfile::tempdir().unwrap();
    let annotations = dir.path().join("phenotype.hpoa");
    fs::write(
        &annotations,
        "#date: 2023-04-05\n\
         database_id\thpo_id\n\
         OMIM:1\tHP:0000316\n\
         OMIM:2\tHP:0000316\n\
         OMIM:2\tHP:0000504\n\
         OMIM:3\tHP:0001507\n",
    )
    .unwrap();
    let counts =
        CountsSource::from_options(Some(annotations), Some("hpo_id".to_string()), false).unwrap();
    let config = SimConfig::new(
        hp_config(dir.path()),
        0.0,
        dir.path().join("out"),
        counts,
        vec!["HP".to_string()],
        None,
    )
    .unwrap();

    assert!(get_similarities(&config).unwrap());
    let resnik: Vec<ResnikRow> = read_rows(&dir.path().join("out").join("HP_resnik"));
    let top = &resnik[0];
    // 4 annotations in total, 2 on HP:0000316
    assert_eq!((top.source.as_str(), top.destination.as_str()), ("HP:0000504", "HP:0000504"));
    assert!((top.resnik_score - 4.0_f64.ln()).abs() < 1e-9);
}

#[test]
fn test_get_similarities_rejects_self_loops() {
    let dir = tempfile::tempdir().unwrap();
    let nodes = dir.path().join("loop_nodes.tsv");
    let edges = dir.path().join("loop_edges.tsv");
    fs::write(&nodes, "id\tcategory\n").unwrap();
    fs::write(
        &edges,
        "subject\tpredicate\tobject\n\
         HP:0000118\tbiolink:subclass_of\tHP:0000001\n\
         HP:0000118\tbiolink:subclass_of\tHP:0000118\n",
    )
    .unwrap();
    let ontology = OntologyConfig::new(
        "HP",
        DEFAULT_PREDICATE,
        OntologySource::Tables { nodes, edges },
        dir.path().to_path_buf(),
    );
    let config = SimConfig::new(
        ontology,
        2.5,
        dir.path().join("out"),
        CountsSource::Uniform,
        vec![],
        None,
    )
    .unwrap();

    assert!(matches!(
        get_similarities(&config),
        Err(SemsimError::SelfLoops { loops: 1, .. })
    ));
}

#[test]
fn test_get_subset_similarities_for_absent_terms() {
    let dir = tempfile::tempdir().unwrap();
    let participants = vec!["HP:0500167".to_string(), "MP:0004731".to_string()];
    let config =
        SubsetConfig::new(hp_config(dir.path()), participants, CountsSource::Uniform).unwrap();

    let similarities = get_subset_similarities(&config).unwrap();
    assert_eq!(similarities.len(), 1);
    let ((term1, term2), (resnik, jaccard)) = similarities.iter().next().unwrap();
    assert_eq!((term1.as_str(), term2.as_str()), ("HP:0500167", "MP:0004731"));
    assert_eq!((*resnik, *jaccard), (0.0, 0.0));
}

#[test]
fn test_get_subset_similarities() {
    let dir = tempfile::tempdir().unwrap();
    let participants = vec![
        "HP:0000316".to_string(),
        "HP:0000504".to_string(),
        "HP:0000271".to_string(),
    ];
    let config =
        SubsetConfig::new(hp_config(dir.path()), participants, CountsSource::Uniform).unwrap();

    let similarities = get_subset_similarities(&config).unwrap();
    assert_eq!(similarities.len(), 3);
    let (resnik, jaccard) = similarities[&("HP:0000316".to_string(), "HP:0000504".to_string())];
    assert!((resnik - 5.5_f64.ln()).abs() < 1e-9);
    assert_eq!(jaccard, 3.0 / 8.0);
    let (_, jaccard) = similarities[&("HP:0000316".to_string(), "HP:0000271".to_string())];
    assert_eq!(jaccard, 2.0 / 9.0);
}
