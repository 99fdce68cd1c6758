//! remote-jobs: a proxied, retrying job-listing scraper
//!
//! This crate fetches the remote job board of a single target site through a
//! mandatory HTTP proxy, extracts job listings from the returned HTML and hands
//! them to a persistence layer.

pub mod config;
pub mod job;
pub mod output;
pub mod scrape;
pub mod server;
pub mod storage;

use thiserror::Error;

/// Main error type for scrape operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Network error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("Unexpected status code from {url}: {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("HTML parse error: {0}")]
    Parse(String),

    #[error("Failed to scrape jobs after {attempts} attempts: {source}")]
    RetryExhausted {
        attempts: u32,
        source: Box<ScrapeError>,
    },

    #[error("Scrape cancelled")]
    Cancelled,
}

impl ScrapeError {
    /// Returns true if this error can only happen inside a single attempt
    ///
    /// Attempt-level errors drive the retry loop and are never surfaced
    /// to callers on their own.
    pub fn is_attempt_error(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::HttpStatus { .. } | Self::Parse(_)
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("proxy not configured")]
    ProxyNotConfigured,

    #[error("invalid proxy URL '{url}': {reason}")]
    InvalidProxyUrl { url: String, reason: String },

    #[error("Invalid job selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// Result type alias for scrape operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use job::Job;
pub use scrape::{scrape_jobs, Scraper};
pub use storage::{persist_jobs, JobStore, SqliteJobStore, StorageError};
