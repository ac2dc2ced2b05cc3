//! Service layer for the release crawler.
//!
//! This module contains the remote-facing logic:
//! - Search service access (`SearchBackend`, `HttpSearchBackend`, `Scroll`)
//! - Paginated release retrieval (`ReleaseFetcher`)

#[cfg(test)]
pub(crate) mod fake;
mod fetcher;
mod search;

pub use fetcher::ReleaseFetcher;
pub use search::{HttpSearchBackend, Query, Scroll, ScrollPage, SearchBackend};
