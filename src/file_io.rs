use csv::{Reader, ReaderBuilder, WriterBuilder};
use serde::Deserialize;
use std::{
    collections::HashMap,
    fs::{self, File},
    io::Read,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::error::{SemsimError, SemsimResult};
use crate::graph::RawGraph;
use crate::structs::{MappingRecord, PhenodigmRow, SimilarityRow};
use crate::TermID;

#[derive(Debug, Deserialize)]
struct KgxNode {
    id: String,
}

#[derive(Debug, Deserialize)]
struct KgxEdge {
    subject: String,
    predicate: String,
    object: String,
}

pub fn ensure_exists(path: &Path) -> SemsimResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(SemsimError::FileNotFound(path.to_path_buf()))
    }
}

/// Opens a delimited file with a header row.
pub fn read_file(filename: &Path, delimiter: u8) -> SemsimResult<Reader<File>> {
    ensure_exists(filename)?;
    let file = File::open(filename)?;
    Ok(ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(file))
}

/// Reads a KGX node/edge TSV pair.
pub fn read_kgx_tables(name: &str, nodes_path: &Path, edges_path: &Path) -> SemsimResult<RawGraph> {
    let mut node_reader = tsv_reader(nodes_path)?;
    let mut nodes: Vec<TermID> = Vec::new();
    for result in node_reader.deserialize() {
        let node: KgxNode = result?;
        nodes.push(node.id);
    }

    let mut edge_reader = tsv_reader(edges_path)?;
    let mut spo = Vec::new();
    for result in edge_reader.deserialize() {
        let edge: KgxEdge = result?;
        spo.push((edge.subject, edge.predicate, edge.object));
    }

    info!(
        "Read {} nodes from {} and {} edges from {}",
        nodes.len(),
        nodes_path.display(),
        spo.len(),
        edges_path.display()
    );
    Ok(RawGraph::new(name, nodes, spo))
}

fn tsv_reader(path: &Path) -> SemsimResult<Reader<File>> {
    ensure_exists(path)?;
    Ok(ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(File::open(path)?))
}

/// Counts occurrences of the values in `column` of a tab-separated
/// annotation table. Lines starting with `#` are skipped.
pub fn parse_annotation_counts<R: Read>(
    input: R,
    column: &str,
    source: &Path,
) -> SemsimResult<HashMap<TermID, usize>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .comment(Some(b'#'))
        .from_reader(input);

    let position = reader
        .headers()?
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| SemsimError::MissingColumn {
            path: source.to_path_buf(),
            column: column.to_string(),
        })?;

    let mut counts: HashMap<TermID, usize> = HashMap::new();
    for result in reader.records() {
        let record = result?;
        if let Some(term) = record.get(position).map(str::trim) {
            if !term.is_empty() {
                *counts.entry(term.to_string()).or_insert(0) += 1;
            }
        }
    }
    debug!("{} distinct terms counted from {}", counts.len(), source.display());
    Ok(counts)
}

pub fn read_annotation_counts(path: &Path, column: &str) -> SemsimResult<HashMap<TermID, usize>> {
    ensure_exists(path)?;
    parse_annotation_counts(File::open(path)?, column, path)
}

/// Reads the `p1`, `p2` columns of an equivalence mapping CSV.
pub fn read_mapping_file(path: &Path) -> SemsimResult<Vec<MappingRecord>> {
    let mut reader = read_file(path, b',')?;
    let mut records = Vec::new();
    for result in reader.deserialize() {
        records.push(result?);
    }
    Ok(records)
}

/// Writes `<name>_resnik` and `<name>_jaccard` into `output_dir`, keeping the
/// order of `rows`.
pub fn write_similarity_tables(
    rows: &[SimilarityRow],
    output_dir: &Path,
    name: &str,
) -> SemsimResult<(PathBuf, PathBuf)> {
    fs::create_dir_all(output_dir)?;
    let resnik_path = output_dir.join(format!("{name}_resnik"));
    let jaccard_path = output_dir.join(format!("{name}_jaccard"));

    let mut resnik_writer = WriterBuilder::new().from_path(&resnik_path)?;
    let mut jaccard_writer = WriterBuilder::new().from_path(&jaccard_path)?;
    for row in rows {
        resnik_writer.serialize(row.resnik_row())?;
        jaccard_writer.serialize(row.jaccard_row())?;
    }
    resnik_writer.flush()?;
    jaccard_writer.flush()?;

    Ok((resnik_path, jaccard_path))
}

/// Tab-delimited, headerless legacy phenodigm output.
pub fn write_phenodigm(rows: &[PhenodigmRow], path: &Path) -> SemsimResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_path(path)?;
    for row in rows {
        writer.write_record(row.to_record())?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HPOA: &str = "#description: \"HPO annotations for rare diseases\"\n\
#date: 2023-04-05\n\
database_id\tdisease_name\tqualifier\thpo_id\treference\n\
OMIM:619340\tDevelopmental and epileptic encephalopathy 96\t\tHP:0011097\tPMID:31675180\n\
OMIM:619340\tDevelopmental and epileptic encephalopathy 96\t\tHP:0002187\tPMID:31675180\n\
OMIM:609153\tPseudohyperkalemia\tNOT\tHP:0011097\tPMID:2766660\n";

    #[test]
    fn test_parse_annotation_counts() {
        let counts =
            parse_annotation_counts(HPOA.as_bytes(), "hpo_id", Path::new("phenotype.hpoa"))
                .unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts["HP:0011097"], 2);
        assert_eq!(counts["HP:0002187"], 1);
    }

    #[test]
    fn test_parse_annotation_counts_missing_column() {
        let result =
            parse_annotation_counts(HPOA.as_bytes(), "HPO_ID", Path::new("phenotype.hpoa"));
        assert!(matches!(
            result,
            Err(SemsimError::MissingColumn { column, .. }) if column == "HPO_ID"
        ));
    }

    #[test]
    fn test_read_file_not_found() {
        let result = read_file(Path::new("./tests/resources/does_not_exist.csv"), b',');
        assert!(matches!(result, Err(SemsimError::FileNotFound(_))));
    }

    #[test]
    fn test_read_kgx_tables() {
        let dir = tempfile::tempdir().unwrap();
        let nodes = dir.path().join("test_nodes.tsv");
        let edges = dir.path().join("test_edges.tsv");
        let mut f = File::create(&nodes).unwrap();
        writeln!(f, "id\tcategory\tname").unwrap();
        writeln!(f, "HP:0000001\tbiolink:PhenotypicFeature\tAll").unwrap();
        writeln!(f, "HP:0000118\tbiolink:PhenotypicFeature\tPhenotypic abnormality").unwrap();
        let mut f = File::create(&edges).unwrap();
        writeln!(f, "id\tsubject\tpredicate\tobject\trelation").unwrap();
        writeln!(f, "e1\tHP:0000118\tbiolink:subclass_of\tHP:0000001\trdfs:subClassOf").unwrap();

        let raw = read_kgx_tables("hp", &nodes, &edges).unwrap();
        assert_eq!(raw.name, "HP");
        assert_eq!(raw.nodes, vec!["HP:0000001".to_string(), "HP:0000118".to_string()]);
        assert_eq!(
            raw.spo,
            vec![(
                "HP:0000118".to_string(),
                "biolink:subclass_of".to_string(),
                "HP:0000001".to_string()
            )]
        );
    }

    #[test]
    fn test_write_similarity_tables() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![SimilarityRow {
            source: "HP:0000316".to_string(),
            destination: "HP:0000504".to_string(),
            resnik_score: 1.5,
            jaccard_score: 0.375,
            mica: vec!["HP:0000478".to_string()],
        }];
        let (resnik, jaccard) = write_similarity_tables(&rows, dir.path(), "HP").unwrap();

        assert!(resnik.ends_with("HP_resnik"));
        let resnik_text = fs::read_to_string(resnik).unwrap();
        assert_eq!(
            resnik_text,
            "source,destination,resnik_score,mica\nHP:0000316,HP:0000504,1.5,HP:0000478\n"
        );
        let jaccard_text = fs::read_to_string(jaccard).unwrap();
        assert_eq!(
            jaccard_text,
            "source,destination,jaccard_score\nHP:0000316,HP:0000504,0.375\n"
        );
    }
}
