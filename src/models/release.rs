//! Release records as fetched from the search service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};

/// Fields projected from every release document.
pub const RELEASE_FIELDS: [&str; 4] = ["distribution", "date", "author", "archive"];

/// A release document exactly as the search service returned it.
///
/// Every field is optional because the service is schema-free; anything
/// beyond the projected fields ends up in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRelease {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl RawRelease {
    /// Check the record carries exactly the projected fields.
    pub fn validate(self) -> Result<Release> {
        let mut missing = Vec::new();
        if self.distribution.is_none() {
            missing.push("distribution");
        }
        if self.date.is_none() {
            missing.push("date");
        }
        if self.author.is_none() {
            missing.push("author");
        }
        if self.archive.is_none() {
            missing.push("archive");
        }

        if !missing.is_empty() {
            return Err(AppError::malformed_record(
                format!("missing {}", missing.join(", ")),
                self.dump(),
            ));
        }
        if !self.extra.is_empty() {
            let unexpected: Vec<&str> = self.extra.keys().map(String::as_str).collect();
            return Err(AppError::malformed_record(
                format!("unexpected {}", unexpected.join(", ")),
                self.dump(),
            ));
        }

        match self {
            RawRelease {
                distribution: Some(distribution),
                date: Some(date),
                author: Some(author),
                archive: Some(archive),
                ..
            } => Ok(Release {
                author,
                distribution,
                archive,
                date,
            }),
            other => Err(AppError::malformed_record("incomplete", other.dump())),
        }
    }

    /// JSON rendering used when reporting a dropped record.
    pub fn dump(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
    }
}

/// A validated release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// Opaque author identity (e.g. a PAUSE id)
    pub author: String,

    /// Distribution name
    pub distribution: String,

    /// Archive filename, unique per release
    pub archive: String,

    /// ISO-8601 publish date
    pub date: String,
}
