use serde::{Deserialize, Serialize};

use crate::utils::to_legacy_id;
use crate::{Jaccard, Resnik, TermID};

/// Scores for one pair of terms, as produced by the all-pairs run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityRow {
    pub source: TermID,
    pub destination: TermID,
    pub resnik_score: Resnik,
    pub jaccard_score: Jaccard,
    pub mica: Vec<TermID>,
}

impl SimilarityRow {
    pub fn resnik_row(&self) -> ResnikRow {
        ResnikRow {
            source: self.source.clone(),
            destination: self.destination.clone(),
            resnik_score: self.resnik_score,
            mica: self.mica.join("|"),
        }
    }

    pub fn jaccard_row(&self) -> JaccardRow {
        JaccardRow {
            source: self.source.clone(),
            destination: self.destination.clone(),
            jaccard_score: self.jaccard_score,
        }
    }
}

/// Row of the `<NAME>_resnik` table. `mica` is pipe-delimited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResnikRow {
    pub source: TermID,
    pub destination: TermID,
    pub resnik_score: Resnik,
    #[serde(default)]
    pub mica: String,
}

/// Row of the `<NAME>_jaccard` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JaccardRow {
    pub source: TermID,
    pub destination: TermID,
    pub jaccard_score: Jaccard,
}

/// Raw row of an equivalence mapping file.
#[derive(Debug, Clone, Deserialize)]
pub struct MappingRecord {
    pub p1: String,
    pub p2: String,
}

/// Normalised equivalence pair; `a_id` carries the first prefix.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MappingPair {
    pub a_id: TermID,
    pub b_id: TermID,
}

/// Line of the legacy phenodigm file.
#[derive(Debug, Clone, PartialEq)]
pub struct PhenodigmRow {
    pub a_id: TermID,
    pub b_id: TermID,
    pub jaccard: Jaccard,
    pub resnik: Resnik,
    pub subsumer: String,
}

impl PhenodigmRow {
    /// Fields in output order, identifiers with `_` instead of `:`.
    pub fn to_record(&self) -> [String; 5] {
        [
            to_legacy_id(&self.a_id),
            to_legacy_id(&self.b_id),
            self.jaccard.to_string(),
            self.resnik.to_string(),
            self.subsumer
                .split('|')
                .filter(|s| !s.is_empty())
                .map(to_legacy_id)
                .collect::<Vec<_>>()
                .join("|"),
        ]
    }
}
