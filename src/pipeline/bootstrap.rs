// src/pipeline/bootstrap.rs

//! Full crawl used when no local tables exist yet.

use std::collections::HashSet;

use crate::error::Result;
use crate::models::{AuthorNum, AuthorRow, DistId, DistRow};
use crate::pipeline::normalize::normalize;
use crate::pipeline::registry::IdRegistry;
use crate::pipeline::sync::{SyncMode, SyncReport};
use crate::pipeline::validate::validate_releases;
use crate::services::ReleaseFetcher;
use crate::storage::LocalTables;

/// Fetch every release and write all three tables from scratch.
///
/// Ids are assigned 1..N in first-seen order; authors and dists are
/// written in id order, releases in fetch order.
pub async fn run_bootstrap(
    fetcher: &ReleaseFetcher<'_>,
    tables: &LocalTables,
) -> Result<SyncReport> {
    log::info!("No existing tables in {}; fetching all releases", tables.root().display());

    let raw = fetcher.fetch_releases(None).await?;
    let fetched = raw.len();
    let (releases, dropped) = validate_releases(raw);

    let mut authors: IdRegistry<AuthorNum> = IdRegistry::new();
    let mut dists: IdRegistry<DistId> = IdRegistry::new();
    for release in &releases {
        authors.get_or_create(&release.author);
        dists.get_or_create(&release.distribution);
    }
    log::info!(
        "{} distinct authors, {} distinct distributions",
        authors.len(),
        dists.len()
    );

    let mut writers = tables.create()?;
    for (author_num, author_id) in authors.entries() {
        writers.authors.write(&AuthorRow {
            author_num,
            author_id: author_id.to_string(),
        })?;
    }
    for (dist_id, dist_name) in dists.entries() {
        writers.dists.write(&DistRow {
            dist_id,
            dist_name: dist_name.to_string(),
        })?;
    }
    writers.authors.flush()?;
    writers.dists.flush()?;

    let mut seen: HashSet<&str> = HashSet::with_capacity(releases.len());
    let mut duplicates = 0;
    let mut watermark = None;
    for release in &releases {
        if !seen.insert(release.archive.as_str()) {
            duplicates += 1;
            log::debug!("Skipping repeated archive {}", release.archive);
            continue;
        }
        let row = normalize(release, &authors, &dists)?;
        watermark = watermark.max(Some(row.date));
        writers.releases.write(&row)?;
    }

    let written = writers.close()?;

    Ok(SyncReport {
        mode: SyncMode::Bootstrap,
        from_date: None,
        fetched,
        dropped,
        duplicates,
        new_authors: written.authors,
        new_dists: written.dists,
        new_releases: written.releases,
        watermark,
    })
}
