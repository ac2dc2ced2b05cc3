//! Storage for the normalized release tables.
//!
//! Three comma-separated tables live side by side in the storage directory.
//! Their presence decides whether a sync bootstraps or updates.

pub mod local;

// Re-export for convenience
pub use local::{
    AUTHORS_FILE, DISTS_FILE, ExistingTables, LocalTables, RELEASES_FILE, TableWriter,
    TableWriters, WriteSummary,
};
