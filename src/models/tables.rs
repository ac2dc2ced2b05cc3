//! Row types for the three persisted tables.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Surrogate key types handed out by an id registry.
pub trait SurrogateId: Copy + Eq + fmt::Debug {
    /// Table-facing name of the key, used in diagnostics.
    const KIND: &'static str;

    fn from_raw(raw: u32) -> Self;
    fn raw(self) -> u32;
}

/// Surrogate key of an author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorNum(pub u32);

/// Surrogate key of a distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistId(pub u32);

impl SurrogateId for AuthorNum {
    const KIND: &'static str = "author";

    fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
    fn raw(self) -> u32 {
        self.0
    }
}

impl SurrogateId for DistId {
    const KIND: &'static str = "distribution";

    fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
    fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for AuthorNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for DistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A row of `authors.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRow {
    pub author_num: AuthorNum,
    pub author_id: String,
}

/// A row of `dists.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistRow {
    pub dist_id: DistId,
    pub dist_name: String,
}

/// A row of `releases.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRow {
    pub author_num: AuthorNum,
    pub dist_id: DistId,
    pub filename: String,
    /// Publish time in Unix epoch seconds
    pub date: i64,
}
