//! Pipeline entry points for sync operations.
//!
//! - `run_sync`: Pick bootstrap or update based on the tables on disk
//! - `run_bootstrap`: Full crawl, tables written from scratch
//! - `run_update`: Incremental crawl appended to existing tables

pub mod bootstrap;
pub mod normalize;
pub mod registry;
pub mod sync;
pub mod update;
pub mod validate;

pub use bootstrap::run_bootstrap;
pub use normalize::normalize;
pub use registry::IdRegistry;
pub use sync::{SyncMode, SyncOptions, SyncReport, run_sync, select_mode};
pub use update::run_update;
pub use validate::validate_releases;
