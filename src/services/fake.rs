//! In-memory search backend for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::RawRelease;
use crate::services::search::{Query, ScrollPage, SearchBackend};
use crate::utils::time::parse_epoch;

const SCROLL_ID: &str = "fake-scroll";

/// Build a complete raw release.
pub fn release(author: &str, distribution: &str, archive: &str, date: &str) -> RawRelease {
    RawRelease {
        author: Some(author.to_string()),
        distribution: Some(distribution.to_string()),
        archive: Some(archive.to_string()),
        date: Some(date.to_string()),
        ..RawRelease::default()
    }
}

#[derive(Debug, Default)]
struct State {
    remaining: Vec<RawRelease>,
    page_size: usize,
    pages_served: usize,
    clears: usize,
    queries: Vec<Query>,
}

/// Serves a fixed record set, honoring the date range filter.
#[derive(Debug, Default)]
pub struct FakeBackend {
    records: Vec<RawRelease>,
    fail_count: bool,
    state: Mutex<State>,
}

impl FakeBackend {
    pub fn new(records: Vec<RawRelease>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    /// A backend whose count query always fails.
    pub fn failing() -> Self {
        Self {
            fail_count: true,
            ..Self::default()
        }
    }

    pub fn set_records(&mut self, records: Vec<RawRelease>) {
        self.records = records;
    }

    pub fn pages_served(&self) -> usize {
        self.state.lock().unwrap().pages_served
    }

    pub fn clears(&self) -> usize {
        self.state.lock().unwrap().clears
    }

    /// Queries passed to `open_scroll`, in order.
    pub fn queries(&self) -> Vec<Query> {
        self.state.lock().unwrap().queries.clone()
    }

    fn matching(&self, query: &Query) -> Vec<RawRelease> {
        let Some(from) = query.lower_bound() else {
            return self.records.clone();
        };
        let from = parse_epoch(from).unwrap();
        self.records
            .iter()
            .filter(|r| {
                r.date
                    .as_deref()
                    .and_then(|d| parse_epoch(d).ok())
                    .is_some_and(|epoch| epoch >= from)
            })
            .cloned()
            .collect()
    }

    fn take_page(state: &mut State) -> ScrollPage {
        let n = state.page_size.min(state.remaining.len());
        let records: Vec<RawRelease> = state.remaining.drain(..n).collect();
        state.pages_served += 1;
        ScrollPage {
            scroll_id: Some(SCROLL_ID.to_string()),
            records,
        }
    }
}

#[async_trait]
impl SearchBackend for FakeBackend {
    async fn count(&self, query: &Query) -> Result<u64> {
        if self.fail_count {
            return Err(AppError::remote("count", "connection refused"));
        }
        Ok(self.matching(query).len() as u64)
    }

    async fn open_scroll(
        &self,
        query: &Query,
        page_size: usize,
        _fields: &[&str],
    ) -> Result<ScrollPage> {
        let matching = self.matching(query);
        let mut state = self.state.lock().unwrap();
        state.remaining = matching;
        state.page_size = page_size.max(1);
        state.queries.push(query.clone());
        Ok(Self::take_page(&mut state))
    }

    async fn next_scroll(&self, scroll_id: &str) -> Result<ScrollPage> {
        if scroll_id != SCROLL_ID {
            return Err(AppError::remote("scroll", "unknown scroll id"));
        }
        let mut state = self.state.lock().unwrap();
        Ok(Self::take_page(&mut state))
    }

    async fn clear_scroll(&self, _scroll_id: &str) -> Result<()> {
        self.state.lock().unwrap().clears += 1;
        Ok(())
    }
}
