// src/pipeline/update.rs

//! Incremental crawl appending releases newer than the stored watermark.
//!
//! The service filter is inclusive of the watermark instant, so releases
//! stamped exactly at the watermark come back again. They are filtered by
//! archive filename, never by date, which also keeps genuinely new releases
//! that share the watermark timestamp.

use std::collections::HashSet;

use crate::error::Result;
use crate::models::{AuthorNum, AuthorRow, DistId, DistRow};
use crate::pipeline::normalize::normalize;
use crate::pipeline::registry::IdRegistry;
use crate::pipeline::sync::{SyncMode, SyncReport};
use crate::pipeline::validate::validate_releases;
use crate::services::ReleaseFetcher;
use crate::storage::LocalTables;
use crate::utils::time::format_epoch;

/// Load the tables, fetch releases from the watermark on, and append.
pub async fn run_update(fetcher: &ReleaseFetcher<'_>, tables: &LocalTables) -> Result<SyncReport> {
    let existing = tables.load()?;
    log::info!(
        "Loaded {} authors, {} distributions, {} releases",
        existing.authors.len(),
        existing.dists.len(),
        existing.releases.len()
    );

    let mut authors: IdRegistry<AuthorNum> = IdRegistry::from_rows(
        existing
            .authors
            .iter()
            .map(|r| (r.author_num, r.author_id.clone())),
    )?;
    let mut dists: IdRegistry<DistId> = IdRegistry::from_rows(
        existing
            .dists
            .iter()
            .map(|r| (r.dist_id, r.dist_name.clone())),
    )?;
    let mut known: HashSet<String> = existing
        .releases
        .iter()
        .map(|r| r.filename.clone())
        .collect();

    let previous = existing.watermark();
    let from_date = previous.map(format_epoch).transpose()?;
    match &from_date {
        Some(from) => log::info!("Fetching releases dated {} or later", from),
        None => log::info!("Release table is empty; fetching all releases"),
    }

    let raw = fetcher.fetch_releases(from_date.as_deref()).await?;
    let fetched = raw.len();
    let (releases, dropped) = validate_releases(raw);

    let mut writers = tables.append()?;
    let mut duplicates = 0;
    let mut watermark = previous;

    for release in &releases {
        let (author_num, new_author) = authors.get_or_create(&release.author);
        if new_author {
            writers.authors.write(&AuthorRow {
                author_num,
                author_id: release.author.clone(),
            })?;
            writers.authors.flush()?;
        }

        let (dist_id, new_dist) = dists.get_or_create(&release.distribution);
        if new_dist {
            writers.dists.write(&DistRow {
                dist_id,
                dist_name: release.distribution.clone(),
            })?;
            writers.dists.flush()?;
        }

        if known.contains(&release.archive) {
            duplicates += 1;
            continue;
        }
        let row = normalize(release, &authors, &dists)?;
        watermark = watermark.max(Some(row.date));
        writers.releases.write(&row)?;
        known.insert(release.archive.clone());
    }

    let written = writers.close()?;

    Ok(SyncReport {
        mode: SyncMode::Update,
        from_date,
        fetched,
        dropped,
        duplicates,
        new_authors: written.authors,
        new_dists: written.dists,
        new_releases: written.releases,
        watermark,
    })
}
