// src/lib.rs

//! Release Crawler Library
//!
//! Syncs release metadata from a package index search service into three
//! normalized CSV tables: authors, distributions and releases.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
