use crate::error::{SemsimError, SemsimResult};
use crate::graph::RawGraph;
use crate::{Predicate, TermID};
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;
use tracing::info;

const EDGE_TABLE: &str = "edge";
const STATEMENTS_TABLE: &str = "statements";

/// Direct (non-entailed) edges of a semantic-sql database for one predicate.
pub fn get_edges_for_predicate(
    path: &Path,
    predicate: &str,
) -> SemsimResult<Vec<(TermID, Predicate, TermID)>> {
    let conn = open(path)?;
    let query = format!("SELECT subject, predicate, object FROM {EDGE_TABLE} WHERE predicate = ?1");
    let mut stmt = conn.prepare(&query)?;
    let rows = stmt.query_map(params![predicate], |row| {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?))
    })?;

    let edges: Result<Vec<_>, _> = rows.collect();
    Ok(edges?)
}

/// Class ids declared in the database, used as the node list.
pub fn get_class_ids(path: &Path) -> SemsimResult<Vec<TermID>> {
    let conn = open(path)?;
    let query = format!(
        "SELECT DISTINCT subject FROM {STATEMENTS_TABLE} WHERE predicate = 'rdf:type' AND object = 'owl:Class'"
    );
    let mut stmt = conn.prepare(&query)?;
    let rows = stmt.query_map([], |row| row.get(0))?;

    let ids: Result<Vec<TermID>, _> = rows.collect();
    Ok(ids?)
}

/// Builds a raw graph from a semantic-sql database.
pub fn load_semsql_graph(name: &str, path: &Path, predicate: &str) -> SemsimResult<RawGraph> {
    let spo = get_edges_for_predicate(path, predicate)?;
    let nodes = get_class_ids(path)?;
    info!(
        "Read {} {} edges and {} classes from {}",
        spo.len(),
        predicate,
        nodes.len(),
        path.display()
    );
    Ok(RawGraph::new(name, nodes, spo))
}

fn open(path: &Path) -> SemsimResult<Connection> {
    if !path.exists() {
        return Err(SemsimError::FileNotFound(path.to_path_buf()));
    }
    Ok(Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY,
    )?)
}
