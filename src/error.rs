// src/error.rs

//! Unified error handling for the release crawler.

use std::fmt;

use thiserror::Error;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading or writing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// The search service answered with an error
    #[error("Search service error during {operation}: {message}")]
    Remote { operation: String, message: String },

    /// A fetched release lacks required fields or carries unexpected ones
    #[error("Malformed release record ({reason}): {record}")]
    MalformedRecord { reason: String, record: String },

    /// A release date could not be parsed
    #[error("Malformed date '{value}'")]
    MalformedDate { value: String },

    /// A release references an author or distribution with no assigned id
    #[error("No {kind} id assigned for '{key}'")]
    MissingMapping { kind: &'static str, key: String },

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a search service error for the given operation.
    pub fn remote(operation: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Remote {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    /// Create a malformed record error.
    pub fn malformed_record(reason: impl Into<String>, record: impl Into<String>) -> Self {
        Self::MalformedRecord {
            reason: reason.into(),
            record: record.into(),
        }
    }

    /// Create a malformed date error.
    pub fn malformed_date(value: impl Into<String>) -> Self {
        Self::MalformedDate {
            value: value.into(),
        }
    }

    /// Create a missing mapping error.
    pub fn missing_mapping(kind: &'static str, key: impl Into<String>) -> Self {
        Self::MissingMapping {
            kind,
            key: key.into(),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
