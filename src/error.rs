use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SemsimError {
    #[error("invalid arguments: {0}")]
    Validation(String),
    #[error("Cannot find {}!", .0.display())]
    FileNotFound(PathBuf),
    #[error("no ontology registered under the name {0}")]
    UnknownOntology(String),
    #[error("term {0} is not present in the graph")]
    UnknownTerm(String),
    #[error("graph {0} is not a DAG")]
    NotDag(String),
    #[error("graph {name} contains self-loops ({loops} found) and is not a DAG; remove them before computing similarities")]
    SelfLoops { name: String, loops: usize },
    #[error("archive {} has no member ending with {suffix}", .archive.display())]
    MissingArchiveMember { archive: PathBuf, suffix: String },
    #[error("column {column} missing from {}", .path.display())]
    MissingColumn { path: PathBuf, column: String },
    #[error("no similarities left for {0} after applying the cutoff")]
    EmptyResult(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type SemsimResult<T> = Result<T, SemsimError>;
