//! Release normalization: validated release → fixed-width table row.

use crate::error::{AppError, Result};
use crate::models::{AuthorNum, DistId, Release, ReleaseRow, SurrogateId};
use crate::pipeline::registry::IdRegistry;
use crate::utils::time::parse_epoch;

/// Build the `releases.csv` row for one release.
///
/// Author and distribution must already be registered.
pub fn normalize(
    release: &Release,
    authors: &IdRegistry<AuthorNum>,
    dists: &IdRegistry<DistId>,
) -> Result<ReleaseRow> {
    let author_num = authors
        .get(&release.author)
        .ok_or_else(|| AppError::missing_mapping(AuthorNum::KIND, &release.author))?;
    let dist_id = dists
        .get(&release.distribution)
        .ok_or_else(|| AppError::missing_mapping(DistId::KIND, &release.distribution))?;

    Ok(ReleaseRow {
        author_num,
        dist_id,
        filename: release.archive.clone(),
        date: parse_epoch(&release.date)?,
    })
}
