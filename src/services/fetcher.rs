// src/services/fetcher.rs

//! Paginated release fetcher.
//!
//! Sizes a progress bar with a count query, then walks the scroll cursor
//! until the service stops returning records.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::error::Result;
use crate::models::{IndexConfig, RELEASE_FIELDS, RawRelease};
use crate::services::search::{Query, Scroll, SearchBackend};

/// Fetches every release matching an optional date lower bound.
pub struct ReleaseFetcher<'a> {
    backend: &'a dyn SearchBackend,
    page_size: usize,
    page_delay: Duration,
    show_progress: bool,
}

impl<'a> ReleaseFetcher<'a> {
    pub fn new(backend: &'a dyn SearchBackend, config: &IndexConfig) -> Self {
        Self {
            backend,
            page_size: config.page_size.max(1),
            page_delay: config.page_delay(),
            show_progress: true,
        }
    }

    /// Enable or disable the progress bar.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Fetch all releases with `date >= from_date` (or all releases).
    pub async fn fetch_releases(&self, from_date: Option<&str>) -> Result<Vec<RawRelease>> {
        let query = Query::from_date(from_date);

        let total = self.backend.count(&query).await?;
        match from_date {
            Some(from) => log::info!("{} releases dated {} or later", total, from),
            None => log::info!("{} releases in the index", total),
        }

        let progress = self.progress_bar(total);
        let mut scroll = Scroll::new(
            self.backend,
            query,
            self.page_size,
            &RELEASE_FIELDS,
            self.page_delay,
        );

        let mut releases = Vec::new();
        let mut pages = 0usize;
        let outcome = loop {
            match scroll.next_page().await {
                Ok(Some(page)) => {
                    pages += 1;
                    progress.inc(page.len() as u64);
                    log::debug!("Page {}: {} releases", pages, page.len());
                    releases.extend(page);
                }
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        progress.finish_and_clear();
        scroll.finish().await;
        outcome?;

        log::info!("Fetched {} releases in {} pages", releases.len(), pages);
        Ok(releases)
    }

    fn progress_bar(&self, total: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stderr());
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} releases ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar
    }
}
