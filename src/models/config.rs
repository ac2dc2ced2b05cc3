//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Search service endpoint and paging behavior
    #[serde(default)]
    pub index: IndexConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        self.index.base_url()?;
        if self.index.user_agent.trim().is_empty() {
            return Err(AppError::validation("index.user_agent is empty"));
        }
        if self.index.timeout_secs == 0 {
            return Err(AppError::validation("index.timeout_secs must be > 0"));
        }
        if self.index.page_size == 0 {
            return Err(AppError::validation("index.page_size must be > 0"));
        }
        if self.index.scroll_ttl.trim().is_empty() {
            return Err(AppError::validation("index.scroll_ttl is empty"));
        }
        Ok(())
    }
}

/// Search service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Root URL of the search API (the `release` type lives below it)
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Records requested per scroll page
    #[serde(default = "defaults::page_size")]
    pub page_size: usize,

    /// Lifetime of the server-side scroll cursor (e.g. "5m")
    #[serde(default = "defaults::scroll_ttl")]
    pub scroll_ttl: String,

    /// Pause between successive page fetches in milliseconds
    #[serde(default = "defaults::page_delay")]
    pub page_delay_ms: u64,
}

impl IndexConfig {
    /// Parsed base URL, always ending in a slash so relative joins keep the path.
    pub fn base_url(&self) -> Result<Url> {
        let trimmed = self.base_url.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("index.base_url is empty"));
        }
        let normalized = if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{trimmed}/")
        };
        Ok(Url::parse(&normalized)?)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            page_size: defaults::page_size(),
            scroll_ttl: defaults::scroll_ttl(),
            page_delay_ms: defaults::page_delay(),
        }
    }
}

mod defaults {
    pub fn base_url() -> String {
        "https://fastapi.metacpan.org/v1/".into()
    }
    pub fn user_agent() -> String {
        concat!("release-crawler/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn timeout() -> u64 {
        60
    }
    pub fn page_size() -> usize {
        1000
    }
    pub fn scroll_ttl() -> String {
        "5m".into()
    }
    pub fn page_delay() -> u64 {
        2000
    }
}
