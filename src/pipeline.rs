//! Query pipeline: cache or fetch, then normalize
//!
//! Each query runs start-to-finish before the next begins. The dashboard runs
//! the pipeline on a background task and receives results over a channel.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cache::CacheManager;
use crate::data::{KeywordClient, KeywordTables, Query, RawPayload};
use crate::export::{self, ExportedFiles};

/// Errors that stop a single query
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Neither the cache nor the service produced a payload
    #[error("No data for {0}")]
    NoData(Query),
}

/// Where a report's payload came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadOrigin {
    /// Read from the cache; carries the original fetch time
    Cache { cached_at: DateTime<Utc> },
    /// Fetched from the service during this run
    Network,
}

/// Everything produced for one query
#[derive(Debug, Clone)]
pub struct QueryReport {
    pub query: Query,
    pub origin: PayloadOrigin,
    pub payload: RawPayload,
    pub tables: KeywordTables,
    /// Cache file holding the payload, if it is on disk
    pub cache_path: Option<PathBuf>,
    /// Exported JSON and CSV files, if an export directory was configured
    pub exported: Option<ExportedFiles>,
}

/// Outcome of one query: a report, or the reason there is none
pub type QueryOutcome = Result<QueryReport, PipelineError>;

/// Fetch/cache/normalize pipeline shared by every source
#[derive(Debug)]
pub struct Pipeline {
    client: KeywordClient,
    cache: CacheManager,
    /// Skip cache lookups (results are still stored)
    refresh: bool,
    export_dir: Option<PathBuf>,
}

impl Pipeline {
    pub fn new(client: KeywordClient, cache: CacheManager) -> Self {
        Self {
            client,
            cache,
            refresh: false,
            export_dir: None,
        }
    }

    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    /// Exports every payload and its tables to `dir` as they are produced
    pub fn with_export_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.export_dir = dir;
        self
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Runs one query
    ///
    /// A cache write failure is logged and does not fail the query.
    pub async fn run(&self, query: &Query) -> QueryOutcome {
        let cached = if self.refresh {
            debug!(query = %query, "refresh requested; skipping cache lookup");
            None
        } else {
            self.cache.lookup(query)
        };

        let (payload, origin, cache_path) = match cached {
            Some(hit) => (
                hit.payload,
                PayloadOrigin::Cache {
                    cached_at: hit.cached_at,
                },
                Some(hit.path),
            ),
            None => {
                let payload = self
                    .client
                    .fetch(query)
                    .await
                    .ok_or_else(|| PipelineError::NoData(query.clone()))?;
                let cache_path = match self.cache.store(query, &payload) {
                    Ok(path) => Some(path),
                    Err(e) => {
                        warn!(query = %query, error = %e, "failed to cache payload");
                        None
                    }
                };
                (payload, PayloadOrigin::Network, cache_path)
            }
        };

        let tables = query.source.normalize(&payload, query.label());
        for diagnostic in &tables.diagnostics {
            info!(query = %query, "{}", diagnostic);
        }

        let exported = self.export_dir.as_ref().and_then(|dir| {
            export::export_report(dir, query, &payload, &tables)
                .map_err(|e| warn!(query = %query, error = %e, "failed to export query"))
                .ok()
        });

        Ok(QueryReport {
            query: query.clone(),
            origin,
            payload,
            tables,
            cache_path,
            exported,
        })
    }

    /// Runs queries one after another, in order
    pub async fn run_all(&self, queries: &[Query]) -> Vec<QueryOutcome> {
        let mut outcomes = Vec::with_capacity(queries.len());
        for query in queries {
            outcomes.push(self.run(query).await);
        }
        outcomes
    }
}

/// Messages sent from the background loader to the dashboard
#[derive(Debug)]
pub enum LoadMessage {
    /// A query is about to run
    Started { index: usize, query: Query },
    /// A query finished, with or without data
    Finished { index: usize, outcome: QueryOutcome },
    /// Every query has been processed
    Done,
}

/// Handle for receiving results from the background loader
pub struct LoadHandle {
    pub receiver: mpsc::Receiver<LoadMessage>,
}

impl LoadHandle {
    /// Spawns a task that runs `queries` through `pipeline` sequentially
    ///
    /// The task stops early if the receiving side is dropped.
    pub fn spawn(pipeline: Pipeline, queries: Vec<Query>) -> Self {
        let (tx, rx) = mpsc::channel(32);

        tokio::spawn(async move {
            for (index, query) in queries.into_iter().enumerate() {
                let started = LoadMessage::Started {
                    index,
                    query: query.clone(),
                };
                if tx.send(started).await.is_err() {
                    return;
                }
                let outcome = pipeline.run(&query).await;
                if tx.send(LoadMessage::Finished { index, outcome }).await.is_err() {
                    return;
                }
            }
            let _ = tx.send(LoadMessage::Done).await;
        });

        Self { receiver: rx }
    }
}
