// src/models/mod.rs

//! Domain models for the release crawler.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod release;
mod tables;

// Re-export all public types
pub use config::{Config, IndexConfig};
pub use release::{RELEASE_FIELDS, RawRelease, Release};
pub use tables::{AuthorNum, AuthorRow, DistId, DistRow, ReleaseRow, SurrogateId};
