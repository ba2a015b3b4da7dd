//! Cross-ontology phenodigm tables.
//!
//! Same-ontology Resnik and Jaccard tables (for instance HP vs. HP) are joined
//! through an equivalence mapping (HP <-> MP) so that every A-term is paired
//! with the B-equivalents of the A-terms it is similar to.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use ordered_float::OrderedFloat;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::config::PhenodigmConfig;
use crate::error::SemsimResult;
use crate::file_io::{ensure_exists, read_file, read_mapping_file, write_phenodigm};
use crate::structs::{JaccardRow, MappingPair, MappingRecord, PhenodigmRow, ResnikRow};
use crate::utils::{has_prefix, normalize_id};
use crate::{Jaccard, TermID};

/// Equivalence pairs restricted to one prefix on each side.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredMap {
    pub column_a: String,
    pub column_b: String,
    pub pairs: Vec<MappingPair>,
}

impl FilteredMap {
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        if name == self.column_a {
            Some(self.pairs.iter().map(|p| p.a_id.as_str()).collect())
        } else if name == self.column_b {
            Some(self.pairs.iter().map(|p| p.b_id.as_str()).collect())
        } else {
            None
        }
    }
}

/// Outcome of a phenodigm run. Terms that could not be scored are listed in
/// `errors` instead of failing the run.
#[derive(Debug, Clone, Default)]
pub struct PhenodigmReport {
    pub outpath: PathBuf,
    pub rows_written: usize,
    pub errors: Vec<String>,
}

/// Normalises the identifiers of `records` and keeps the pairs linking
/// `prefix_a` to `prefix_b`, oriented A first. Duplicates are dropped.
pub fn make_filtered_map(
    records: &[MappingRecord],
    prefix_a: &str,
    prefix_b: &str,
) -> FilteredMap {
    let mut pairs: BTreeSet<MappingPair> = BTreeSet::new();
    for record in records {
        let (p1, p2) = (normalize_id(&record.p1), normalize_id(&record.p2));
        let oriented = if has_prefix(&p1, prefix_a) && has_prefix(&p2, prefix_b) {
            Some((p1, p2))
        } else if has_prefix(&p2, prefix_a) && has_prefix(&p1, prefix_b) {
            Some((p2, p1))
        } else {
            None
        };
        if let Some((a_id, b_id)) = oriented {
            pairs.insert(MappingPair { a_id, b_id });
        }
    }

    FilteredMap {
        column_a: format!("{}_id", prefix_a.trim_end_matches(':')),
        column_b: format!("{}_id", prefix_b.trim_end_matches(':')),
        pairs: pairs.into_iter().collect(),
    }
}

/// Reads a similarity table, collecting unreadable rows into `errors`.
fn read_scores<T: DeserializeOwned>(
    path: &Path,
    errors: &mut Vec<String>,
) -> SemsimResult<Vec<T>> {
    let mut reader = read_file(path, b',')?;
    let mut rows = Vec::new();
    for (idx, result) in reader.deserialize::<T>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            // +2: header line and 1-based numbering
            Err(e) => errors.push(format!("{} line {}: {e}", path.display(), idx + 2)),
        }
    }
    Ok(rows)
}

/// Resnik rows keyed by both of their terms.
fn index_resnik(rows: Vec<ResnikRow>) -> HashMap<TermID, Vec<ResnikRow>> {
    let mut index: HashMap<TermID, Vec<ResnikRow>> = HashMap::new();
    for row in rows {
        if row.source != row.destination {
            let mirrored = ResnikRow {
                source: row.destination.clone(),
                destination: row.source.clone(),
                resnik_score: row.resnik_score,
                mica: row.mica.clone(),
            };
            index.entry(mirrored.source.clone()).or_default().push(mirrored);
        }
        index.entry(row.source.clone()).or_default().push(row);
    }
    index
}

fn index_jaccard(rows: Vec<JaccardRow>) -> HashMap<(TermID, TermID), Jaccard> {
    let mut index = HashMap::new();
    for row in rows {
        index.insert(
            (row.destination.clone(), row.source.clone()),
            row.jaccard_score,
        );
        index.insert((row.source, row.destination), row.jaccard_score);
    }
    index
}

/// Keeps one row per (A, B) pair: highest Resnik, then highest Jaccard.
fn best_row_per_pair(mut rows: Vec<PhenodigmRow>) -> Vec<PhenodigmRow> {
    rows.sort_by(|x, y| {
        x.a_id
            .cmp(&y.a_id)
            .then_with(|| x.b_id.cmp(&y.b_id))
            .then_with(|| OrderedFloat(y.resnik).cmp(&OrderedFloat(x.resnik)))
            .then_with(|| OrderedFloat(y.jaccard).cmp(&OrderedFloat(x.jaccard)))
    });
    rows.dedup_by(|later, kept| later.a_id == kept.a_id && later.b_id == kept.b_id);

    rows.sort_by(|x, y| {
        x.a_id
            .cmp(&y.a_id)
            .then_with(|| OrderedFloat(y.resnik).cmp(&OrderedFloat(x.resnik)))
            .then_with(|| x.b_id.cmp(&y.b_id))
    });
    rows
}

/// Builds the phenodigm file described by `config`.
pub fn make_phenodigm(config: &PhenodigmConfig) -> SemsimResult<PhenodigmReport> {
    for path in [
        &config.jaccard_sim_file,
        &config.resnik_sim_file,
        &config.mapping_file,
    ] {
        ensure_exists(path)?;
    }

    let filtered = make_filtered_map(
        &read_mapping_file(&config.mapping_file)?,
        &config.prefix_a,
        &config.prefix_b,
    );
    info!(
        "{} {}-{} equivalence pairs in {}",
        filtered.pairs.len(),
        config.prefix_a,
        config.prefix_b,
        config.mapping_file.display()
    );

    let mut equivalents: HashMap<&str, Vec<&str>> = HashMap::new();
    for pair in filtered.pairs.iter() {
        equivalents
            .entry(pair.a_id.as_str())
            .or_default()
            .push(pair.b_id.as_str());
    }

    let mut errors = Vec::new();
    let resnik = index_resnik(read_scores(&config.resnik_sim_file, &mut errors)?);
    let jaccard = index_jaccard(read_scores(&config.jaccard_sim_file, &mut errors)?);

    let a_terms: BTreeSet<&str> = filtered.pairs.iter().map(|p| p.a_id.as_str()).collect();
    let mut rows: Vec<PhenodigmRow> = Vec::new();
    for a_term in a_terms {
        let Some(matches) = resnik.get(a_term) else {
            errors.push(format!("No Resnik scores for {a_term}"));
            continue;
        };
        for hit in matches.iter().filter(|m| m.resnik_score >= config.cutoff) {
            let Some(targets) = equivalents.get(hit.destination.as_str()) else {
                continue;
            };
            let key = (a_term.to_string(), hit.destination.clone());
            let Some(&jaccard_score) = jaccard.get(&key) else {
                errors.push(format!(
                    "No Jaccard score for {a_term} and {}",
                    hit.destination
                ));
                continue;
            };
            rows.extend(targets.iter().map(|b_term| PhenodigmRow {
                a_id: a_term.to_string(),
                b_id: b_term.to_string(),
                jaccard: jaccard_score,
                resnik: hit.resnik_score,
                subsumer: hit.mica.clone(),
            }));
        }
    }

    let rows = best_row_per_pair(rows);
    write_phenodigm(&rows, &config.outpath)?;
    info!("Wrote {} rows to {}.", rows.len(), config.outpath.display());

    if !errors.is_empty() {
        warn!("{} terms or rows could not be scored:", errors.len());
        for e in errors.iter() {
            warn!("{e}");
        }
    }

    Ok(PhenodigmReport {
        outpath: config.outpath.clone(),
        rows_written: rows.len(),
        errors,
    })
}
