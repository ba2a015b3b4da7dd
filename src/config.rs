use std::path::PathBuf;

use crate::enums::OntologySource;
use crate::error::{SemsimError, SemsimResult};
use crate::fetch::{DEFAULT_ANNOTATION_COLUMN, DEFAULT_ANNOTATION_URL};
use crate::utils::curie_prefix;
use crate::TermID;

pub const DEFAULT_PREDICATE: &str = "biolink:subclass_of";
pub const DEFAULT_CUTOFF: f64 = 2.5;
pub const PHENODIGM_FILE_NAME: &str = "phenodigm_semsim.txt";

/// Where term frequencies for the Resnik model come from.
#[derive(Clone, Debug, PartialEq)]
pub enum CountsSource {
    /// Every node counts 1.
    Uniform,
    File { path: PathBuf, column: String },
    Remote { url: String, column: String },
}

impl CountsSource {
    /// An annotation file and its column must be given together.
    pub fn from_options(
        annot_file: Option<PathBuf>,
        annot_col: Option<String>,
        remote: bool,
    ) -> SemsimResult<CountsSource> {
        match (annot_file, annot_col) {
            (Some(path), Some(column)) => Ok(CountsSource::File { path, column }),
            (None, None) if remote => Ok(CountsSource::Remote {
                url: DEFAULT_ANNOTATION_URL.to_string(),
                column: DEFAULT_ANNOTATION_COLUMN.to_string(),
            }),
            (None, Some(column)) if remote => Ok(CountsSource::Remote {
                url: DEFAULT_ANNOTATION_URL.to_string(),
                column,
            }),
            (None, None) => Ok(CountsSource::Uniform),
            _ => Err(SemsimError::Validation(
                "Need both annot_file and annot_col if using specific freq values.".to_string(),
            )),
        }
    }
}

/// Settings shared by every command that loads an ontology.
#[derive(Clone, Debug)]
pub struct OntologyConfig {
    pub ontology: String,
    pub predicate: String,
    pub source: OntologySource,
    pub cache_dir: PathBuf,
}

impl OntologyConfig {
    pub fn new(
        ontology: &str,
        predicate: &str,
        source: OntologySource,
        cache_dir: PathBuf,
    ) -> Self {
        OntologyConfig {
            ontology: ontology.trim().to_uppercase(),
            predicate: predicate.to_string(),
            source,
            cache_dir,
        }
    }
}

/// Options of the all-pairs `sim` run.
#[derive(Clone, Debug)]
pub struct SimConfig {
    pub ontology: OntologyConfig,
    pub cutoff: f64,
    pub output_dir: PathBuf,
    pub counts: CountsSource,
    pub prefixes: Vec<String>,
    pub root_node: Option<TermID>,
}

impl SimConfig {
    pub fn new(
        ontology: OntologyConfig,
        cutoff: f64,
        output_dir: PathBuf,
        counts: CountsSource,
        prefixes: Vec<String>,
        root_node: Option<TermID>,
    ) -> SemsimResult<SimConfig> {
        if !cutoff.is_finite() {
            return Err(SemsimError::Validation(format!("cutoff must be a number, got {cutoff}")));
        }
        // default to the ontology's own prefix
        let prefixes = if prefixes.is_empty() {
            vec![ontology.ontology.clone()]
        } else {
            prefixes
        };
        let root_node = root_node.filter(|r| !r.trim().is_empty());
        Ok(SimConfig {
            ontology,
            cutoff,
            output_dir,
            counts,
            prefixes,
            root_node,
        })
    }
}

/// Options of the `somesim` run over an explicit list of terms.
#[derive(Clone, Debug)]
pub struct SubsetConfig {
    pub ontology: OntologyConfig,
    pub participants: Vec<TermID>,
    pub counts: CountsSource,
}

impl SubsetConfig {
    pub fn new(
        ontology: OntologyConfig,
        participants: Vec<TermID>,
        counts: CountsSource,
    ) -> SemsimResult<SubsetConfig> {
        if participants.len() < 2 {
            return Err(SemsimError::Validation(format!(
                "need at least two participants, got {}",
                participants.len()
            )));
        }
        Ok(SubsetConfig {
            ontology,
            participants,
            counts,
        })
    }

    /// Distinct CURIE prefixes of the participants, in first-seen order.
    pub fn prefixes(&self) -> Vec<String> {
        let mut prefixes: Vec<String> = Vec::new();
        for prefix in self.participants.iter().filter_map(|p| curie_prefix(p)) {
            if !prefixes.iter().any(|p| p == prefix) {
                prefixes.push(prefix.to_string());
            }
        }
        prefixes
    }
}

/// Options of the `phenodigm` table assembly.
#[derive(Clone, Debug)]
pub struct PhenodigmConfig {
    pub cutoff: f64,
    pub jaccard_sim_file: PathBuf,
    pub resnik_sim_file: PathBuf,
    pub mapping_file: PathBuf,
    pub outpath: PathBuf,
    pub prefix_a: String,
    pub prefix_b: String,
}

impl PhenodigmConfig {
    pub fn new(
        cutoff: f64,
        jaccard_sim_file: PathBuf,
        resnik_sim_file: PathBuf,
        mapping_file: PathBuf,
        output_dir: PathBuf,
        prefixes: &[String],
    ) -> SemsimResult<PhenodigmConfig> {
        let [prefix_a, prefix_b] = prefixes else {
            return Err(SemsimError::Validation(
                "Only pairs of prefixes are supported.".to_string(),
            ));
        };
        Ok(PhenodigmConfig {
            cutoff,
            jaccard_sim_file,
            resnik_sim_file,
            mapping_file,
            outpath: output_dir.join(PHENODIGM_FILE_NAME),
            prefix_a: prefix_a.clone(),
            prefix_b: prefix_b.clone(),
        })
    }
}
