use std::path::PathBuf;

use crate::error::{SemsimError, SemsimResult};

pub const KGOBO_BASE_URL: &str = "https://kg-hub.berkeleybop.io/kg-obo";
pub const DEFAULT_KGOBO_VERSION: &str = "current";

/// Ontologies that can be fetched by short name from KG-OBO.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KnownOntology {
    Hp,
    Mp,
    Mondo,
    Go,
    Uberon,
    Cl,
    Doid,
    Zp,
    Chebi,
    Upheno,
}

impl KnownOntology {
    pub const ALL: [KnownOntology; 10] = [
        KnownOntology::Hp,
        KnownOntology::Mp,
        KnownOntology::Mondo,
        KnownOntology::Go,
        KnownOntology::Uberon,
        KnownOntology::Cl,
        KnownOntology::Doid,
        KnownOntology::Zp,
        KnownOntology::Chebi,
        KnownOntology::Upheno,
    ];

    pub fn as_str(&self) -> &str {
        match *self {
            KnownOntology::Hp => "HP",
            KnownOntology::Mp => "MP",
            KnownOntology::Mondo => "MONDO",
            KnownOntology::Go => "GO",
            KnownOntology::Uberon => "UBERON",
            KnownOntology::Cl => "CL",
            KnownOntology::Doid => "DOID",
            KnownOntology::Zp => "ZP",
            KnownOntology::Chebi => "CHEBI",
            KnownOntology::Upheno => "UPHENO",
        }
    }

    /// Case-insensitive lookup by short name.
    pub fn from_string(s: &str) -> SemsimResult<Self> {
        let wanted = s.trim().to_uppercase();
        KnownOntology::ALL
            .iter()
            .find(|o| o.as_str() == wanted)
            .copied()
            .ok_or_else(|| SemsimError::UnknownOntology(s.to_string()))
    }

    /// KG-OBO publishes uPheno under its second release line.
    fn kgobo_name(&self) -> String {
        match *self {
            KnownOntology::Upheno => "upheno2".to_string(),
            other => other.as_str().to_lowercase(),
        }
    }

    pub fn archive_name(&self) -> String {
        format!("{}_kgx_tsv.tar.gz", self.kgobo_name())
    }

    pub fn kgobo_url(&self, version: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            KGOBO_BASE_URL,
            self.kgobo_name(),
            version,
            self.archive_name()
        )
    }
}

/// Where an ontology graph is read from.
#[derive(Clone, Debug, PartialEq)]
pub enum OntologySource {
    /// Downloaded from KG-OBO by name.
    Registry { version: String },
    /// Local KGX `.tar.gz` archive.
    Archive(PathBuf),
    /// KGX node and edge TSV files.
    Tables { nodes: PathBuf, edges: PathBuf },
    /// semantic-sql SQLite database.
    SemSql(PathBuf),
}

impl Default for OntologySource {
    fn default() -> Self {
        OntologySource::Registry {
            version: DEFAULT_KGOBO_VERSION.to_string(),
        }
    }
}
