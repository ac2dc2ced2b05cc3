// src/pipeline/validate.rs

use crate::error::AppError;
use crate::models::{RawRelease, Release};

/// Split fetched records into valid releases, dropping malformed ones.
///
/// Dropped records are logged in full so they can be inspected by hand.
/// Returns the valid releases in fetch order and the number dropped.
pub fn validate_releases(raw: Vec<RawRelease>) -> (Vec<Release>, usize) {
    let mut releases = Vec::with_capacity(raw.len());
    let mut dropped = 0;

    for record in raw {
        match record.validate() {
            Ok(release) => releases.push(release),
            Err(AppError::MalformedRecord { reason, record }) => {
                dropped += 1;
                log::warn!("Dropping release record ({}): {}", reason, record);
            }
            Err(other) => {
                dropped += 1;
                log::warn!("Dropping release record: {}", other);
            }
        }
    }

    if dropped > 0 {
        log::warn!("{} malformed release records dropped", dropped);
    }
    (releases, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fake::release;

    #[test]
    fn test_drops_incomplete_records() {
        let mut missing_author = release("A", "One", "One-1.tar.gz", "2014-01-01T00:00:00");
        missing_author.author = None;
        let mut extra = release("B", "Two", "Two-1.tar.gz", "2014-01-01T00:00:00");
        extra
            .extra
            .insert("status".to_string(), serde_json::json!("cpan"));

        let (releases, dropped) = validate_releases(vec![
            missing_author,
            release("C", "Three", "Three-1.tar.gz", "2014-01-01T00:00:00"),
            extra,
        ]);

        assert_eq!(dropped, 2);
        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].archive, "Three-1.tar.gz");
    }
}
