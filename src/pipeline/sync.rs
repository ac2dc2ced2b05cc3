// src/pipeline/sync.rs

//! Sync entry point: picks bootstrap or update from what is on disk.

use std::fmt;

use crate::error::Result;
use crate::models::Config;
use crate::services::{ReleaseFetcher, SearchBackend};
use crate::storage::LocalTables;
use crate::utils::time::format_epoch;

use super::bootstrap::run_bootstrap;
use super::update::run_update;

/// Which crawl a sync ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Full crawl, tables written from scratch
    Bootstrap,
    /// Incremental crawl appended to existing tables
    Update,
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMode::Bootstrap => write!(f, "bootstrap"),
            SyncMode::Update => write!(f, "update"),
        }
    }
}

/// Knobs for a single sync run.
#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    /// Draw a progress bar while fetching
    pub show_progress: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            show_progress: true,
        }
    }
}

/// Outcome of one sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub mode: SyncMode,
    /// Lower bound sent to the search service, if any
    pub from_date: Option<String>,
    /// Records returned by the service
    pub fetched: usize,
    /// Malformed records discarded
    pub dropped: usize,
    /// Records skipped because their archive was already recorded
    pub duplicates: usize,
    pub new_authors: usize,
    pub new_dists: usize,
    pub new_releases: usize,
    /// Latest release date on disk after the run
    pub watermark: Option<i64>,
}

impl SyncReport {
    /// Log a summary of the run.
    pub fn log_summary(&self) {
        log::info!("Sync finished ({})", self.mode);
        if let Some(from) = &self.from_date {
            log::info!("    From: {}", from);
        }
        log::info!("    Fetched: {}", self.fetched);
        log::info!("    Dropped: {}", self.dropped);
        log::info!("    Already known: {}", self.duplicates);
        log::info!("    New authors: {}", self.new_authors);
        log::info!("    New distributions: {}", self.new_dists);
        log::info!("    New releases: {}", self.new_releases);
        if let Some(watermark) = self.watermark.and_then(|w| format_epoch(w).ok()) {
            log::info!("    Watermark: {}", watermark);
        }
    }
}

/// Choose the crawl mode: update only when every table exists.
///
/// Existing tables are never rebuilt; once all three are present every
/// later run appends.
pub fn select_mode(tables: &LocalTables) -> SyncMode {
    if tables.all_exist() {
        SyncMode::Update
    } else {
        SyncMode::Bootstrap
    }
}

/// Run a bootstrap or update crawl against `backend`.
pub async fn run_sync(
    config: &Config,
    tables: &LocalTables,
    backend: &dyn SearchBackend,
    options: SyncOptions,
) -> Result<SyncReport> {
    let fetcher = ReleaseFetcher::new(backend, &config.index).with_progress(options.show_progress);

    let mode = select_mode(tables);
    log::info!("Running {} sync in {}", mode, tables.root().display());

    match mode {
        SyncMode::Bootstrap => run_bootstrap(&fetcher, tables).await,
        SyncMode::Update => run_update(&fetcher, tables).await,
    }
}
