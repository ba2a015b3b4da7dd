//! Remote resources: KG-OBO graph archives and annotation files.

use std::{
    collections::HashMap,
    fs::{self, File},
    io::{self, Read},
    path::{Path, PathBuf},
    time::Duration,
};

use flate2::read::GzDecoder;
use tar::Archive;
use tracing::{debug, info};

use crate::error::{SemsimError, SemsimResult};
use crate::file_io::{ensure_exists, parse_annotation_counts, read_kgx_tables};
use crate::graph::RawGraph;
use crate::TermID;

pub const DEFAULT_ANNOTATION_URL: &str = "http://purl.obolibrary.org/obo/hp/hpoa/phenotype.hpoa";
pub const DEFAULT_ANNOTATION_COLUMN: &str = "hpo_id";

const NODES_SUFFIX: &str = "_nodes.tsv";
const EDGES_SUFFIX: &str = "_edges.tsv";
const USER_AGENT: &str = concat!("semsim/", env!("CARGO_PKG_VERSION"));

fn client() -> SemsimResult<reqwest::blocking::Client> {
    Ok(reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(600))
        .user_agent(USER_AGENT)
        .build()?)
}

/// Downloads `url` to `destination` unless the file is already there.
pub fn download_to(url: &str, destination: &Path) -> SemsimResult<PathBuf> {
    if destination.exists() {
        info!("Using cached {}", destination.display());
        return Ok(destination.to_path_buf());
    }
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }

    info!("Downloading {url}...");
    let mut response = client()?.get(url).send()?.error_for_status()?;
    // a partial download never sits at the cached path
    let partial = destination.with_extension("part");
    let mut file = File::create(&partial)?;
    let bytes = io::copy(&mut response, &mut file)?;
    fs::rename(&partial, destination)?;
    debug!("Wrote {bytes} bytes to {}", destination.display());

    Ok(destination.to_path_buf())
}

/// Fetches a remote annotation file and counts the terms in `column`.
pub fn fetch_annotation_counts(url: &str, column: &str) -> SemsimResult<HashMap<TermID, usize>> {
    info!("Retrieving annotation counts from {url}...");
    let response = client()?.get(url).send()?.error_for_status()?;
    parse_annotation_counts(response, column, Path::new(url))
}

/// Extracts the KGX node and edge tables from a `.tar.gz` into the
/// archive's directory and returns their paths.
pub fn extract_kgx_tables(archive_path: &Path) -> SemsimResult<(PathBuf, PathBuf)> {
    ensure_exists(archive_path)?;
    let outdir = archive_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let decoder = GzDecoder::new(File::open(archive_path)?);
    let mut archive = Archive::new(decoder);

    let mut nodes = None;
    let mut edges = None;
    for entry in archive.entries()? {
        let mut entry = entry?;
        let member = entry.path()?.to_path_buf();
        let member_name = member.to_string_lossy().to_string();
        let Some(file_name) = member.file_name() else {
            continue;
        };
        let target = outdir.join(file_name);
        if member_name.ends_with(NODES_SUFFIX) {
            copy_entry(&mut entry, &target)?;
            nodes = Some(target);
        } else if member_name.ends_with(EDGES_SUFFIX) {
            copy_entry(&mut entry, &target)?;
            edges = Some(target);
        }
    }

    let missing = |suffix: &str| SemsimError::MissingArchiveMember {
        archive: archive_path.to_path_buf(),
        suffix: suffix.to_string(),
    };
    Ok((
        nodes.ok_or_else(|| missing(NODES_SUFFIX))?,
        edges.ok_or_else(|| missing(EDGES_SUFFIX))?,
    ))
}

fn copy_entry<R: Read>(entry: &mut R, target: &Path) -> SemsimResult<()> {
    let mut out = File::create(target)?;
    io::copy(entry, &mut out)?;
    debug!("Extracted {}", target.display());
    Ok(())
}

/// Loads a graph from a local KGX archive.
pub fn load_local_graph(name: &str, archive_path: &Path) -> SemsimResult<RawGraph> {
    let (nodes, edges) = extract_kgx_tables(archive_path)?;
    read_kgx_tables(name, &nodes, &edges)
}
