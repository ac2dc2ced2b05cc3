//! Local filesystem storage for the three CSV tables.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── config.toml     # Crawler configuration
//! ├── authors.csv     # author_num,author_id
//! ├── dists.csv       # dist_id,dist_name
//! └── releases.csv    # author_num,dist_id,filename,date
//! ```
//!
//! Tables are append-only: a bootstrap creates them with headers, later
//! runs only ever append rows.

use std::fs::{self, File, OpenOptions};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Writer, WriterBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};
use crate::models::{AuthorRow, DistRow, ReleaseRow};

pub const AUTHORS_FILE: &str = "authors.csv";
pub const DISTS_FILE: &str = "dists.csv";
pub const RELEASES_FILE: &str = "releases.csv";

const AUTHORS_HEADER: [&str; 2] = ["author_num", "author_id"];
const DISTS_HEADER: [&str; 2] = ["dist_id", "dist_name"];
const RELEASES_HEADER: [&str; 4] = ["author_num", "dist_id", "filename", "date"];

/// Rows currently on disk.
#[derive(Debug, Clone, Default)]
pub struct ExistingTables {
    pub authors: Vec<AuthorRow>,
    pub dists: Vec<DistRow>,
    pub releases: Vec<ReleaseRow>,
}

impl ExistingTables {
    /// Latest release date already captured.
    pub fn watermark(&self) -> Option<i64> {
        self.releases.iter().map(|r| r.date).max()
    }
}

/// Row counts written by one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub authors: usize,
    pub dists: usize,
    pub releases: usize,
}

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalTables {
    root_dir: PathBuf,
}

impl LocalTables {
    /// Create storage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    /// Get the full path for a table file.
    pub fn path(&self, file_name: &str) -> PathBuf {
        self.root_dir.join(file_name)
    }

    /// Whether all three tables are present.
    pub fn all_exist(&self) -> bool {
        [AUTHORS_FILE, DISTS_FILE, RELEASES_FILE]
            .iter()
            .all(|name| self.path(name).is_file())
    }

    /// Read every table, skipping header rows.
    pub fn load(&self) -> Result<ExistingTables> {
        Ok(ExistingTables {
            authors: self.read_rows(AUTHORS_FILE)?,
            dists: self.read_rows(DISTS_FILE)?,
            releases: self.read_rows(RELEASES_FILE)?,
        })
    }

    /// Create fresh tables with headers. Only used when a table is missing.
    pub fn create(&self) -> Result<TableWriters> {
        fs::create_dir_all(&self.root_dir)?;
        Ok(TableWriters {
            authors: TableWriter::create(self.path(AUTHORS_FILE), &AUTHORS_HEADER)?,
            dists: TableWriter::create(self.path(DISTS_FILE), &DISTS_HEADER)?,
            releases: TableWriter::create(self.path(RELEASES_FILE), &RELEASES_HEADER)?,
        })
    }

    /// Open existing tables for appending.
    pub fn append(&self) -> Result<TableWriters> {
        Ok(TableWriters {
            authors: TableWriter::append(self.path(AUTHORS_FILE))?,
            dists: TableWriter::append(self.path(DISTS_FILE))?,
            releases: TableWriter::append(self.path(RELEASES_FILE))?,
        })
    }

    fn read_rows<T: DeserializeOwned>(&self, file_name: &str) -> Result<Vec<T>> {
        let path = self.path(file_name);
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_path(&path)?;

        let rows = reader
            .deserialize()
            .collect::<std::result::Result<Vec<T>, csv::Error>>()?;
        log::debug!("Read {} rows from {}", rows.len(), path.display());
        Ok(rows)
    }
}

/// Append-only writer for one table.
#[derive(Debug)]
pub struct TableWriter<T> {
    path: PathBuf,
    writer: Writer<File>,
    rows: usize,
    _row: PhantomData<T>,
}

impl<T: Serialize> TableWriter<T> {
    fn create(path: PathBuf, header: &[&str]) -> Result<Self> {
        let file = File::create(&path)?;
        let mut table = Self::from_file(path, file);
        table.writer.write_record(header)?;
        Ok(table)
    }

    fn append(path: PathBuf) -> Result<Self> {
        let file = OpenOptions::new().append(true).open(&path)?;
        Ok(Self::from_file(path, file))
    }

    fn from_file(path: PathBuf, file: File) -> Self {
        Self {
            path,
            writer: WriterBuilder::new().has_headers(false).from_writer(file),
            rows: 0,
            _row: PhantomData,
        }
    }

    /// Append one row.
    pub fn write(&mut self, row: &T) -> Result<()> {
        self.writer.serialize(row)?;
        self.rows += 1;
        Ok(())
    }

    /// Push buffered rows to the file.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and sync the file; any failure here is fatal for the run.
    pub fn close(self) -> Result<usize> {
        let file = self.writer.into_inner().map_err(|e| {
            AppError::Io(std::io::Error::new(
                e.error().kind(),
                format!("closing {}: {}", self.path.display(), e.error()),
            ))
        })?;
        file.sync_all()?;
        Ok(self.rows)
    }
}

/// Writers for all three tables, open for the duration of a run.
#[derive(Debug)]
pub struct TableWriters {
    pub authors: TableWriter<AuthorRow>,
    pub dists: TableWriter<DistRow>,
    pub releases: TableWriter<ReleaseRow>,
}

impl TableWriters {
    /// Close every table, authors and dists before releases.
    pub fn close(self) -> Result<WriteSummary> {
        Ok(WriteSummary {
            authors: self.authors.close()?,
            dists: self.dists.close()?,
            releases: self.releases.close()?,
        })
    }
}
