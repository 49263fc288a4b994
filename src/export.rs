//! Export of a query's raw JSON and its normalized tables as CSV
//!
//! Files are named after the query's cache stem with their own suffixes
//! (`.export.json`, `.<table>.csv`), so exporting into the cache directory
//! never replaces a cache entry.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::cache::CacheManager;
use crate::data::{KeywordTables, Query, RawPayload};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to create export directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("Failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("Failed to write CSV {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

/// Files written by one export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    /// Pretty-printed raw payload
    pub json: PathBuf,
    /// One CSV per non-empty table
    pub tables: Vec<PathBuf>,
}

impl ExportedFiles {
    pub fn count(&self) -> usize {
        1 + self.tables.len()
    }
}

/// Path of the raw JSON export for `query` inside `dir`
pub fn json_path(dir: &Path, query: &Query) -> PathBuf {
    dir.join(format!("{}.export.json", CacheManager::file_stem(query)))
}

/// Path of the CSV export of `table` for `query` inside `dir`
pub fn csv_path(dir: &Path, query: &Query, table: &str) -> PathBuf {
    dir.join(format!("{}.{}.csv", CacheManager::file_stem(query), table))
}

fn ensure_dir(dir: &Path) -> Result<(), ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Writes `payload` pretty-printed to `dir`
///
/// An existing export for the same query is overwritten.
pub fn export_payload(
    dir: &Path,
    query: &Query,
    payload: &RawPayload,
) -> Result<PathBuf, ExportError> {
    ensure_dir(dir)?;

    let path = json_path(dir, query);
    let mut body = payload.to_pretty_json();
    body.push('\n');
    fs::write(&path, body).map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;

    info!(query = %query, path = %path.display(), "exported payload");
    Ok(path)
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `rows` as `<stem>.<name>.csv`; empty tables are skipped
fn write_table<T: Serialize>(
    dir: &Path,
    query: &Query,
    name: &str,
    rows: &[T],
    written: &mut Vec<PathBuf>,
) -> Result<(), ExportError> {
    if rows.is_empty() {
        return Ok(());
    }
    let path = csv_path(dir, query, name);
    write_csv(&path, rows).map_err(|source| ExportError::Csv {
        path: path.clone(),
        source,
    })?;
    written.push(path);
    Ok(())
}

/// Writes each non-empty table of `tables` to its own CSV file in `dir`
pub fn export_tables(
    dir: &Path,
    query: &Query,
    tables: &KeywordTables,
) -> Result<Vec<PathBuf>, ExportError> {
    ensure_dir(dir)?;

    let mut written = Vec::new();
    write_table(dir, query, "overview", &tables.overview, &mut written)?;
    write_table(dir, query, "trend", &tables.trend, &mut written)?;
    write_table(dir, query, "regions", &tables.regional_interest, &mut written)?;
    write_table(dir, query, "ideas", &tables.ideas, &mut written)?;

    info!(query = %query, files = written.len(), "exported tables");
    Ok(written)
}

/// Exports the raw payload and every non-empty table
pub fn export_report(
    dir: &Path,
    query: &Query,
    payload: &RawPayload,
    tables: &KeywordTables,
) -> Result<ExportedFiles, ExportError> {
    let json = export_payload(dir, query, payload)?;
    let tables = export_tables(dir, query, tables)?;
    Ok(ExportedFiles { json, tables })
}
