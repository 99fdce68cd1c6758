//! Storage traits and error types
//!
//! This module defines the trait interface for job storage backends and
//! associated error types.

use crate::job::Job;
use crate::storage::{RunOutcome, RunRecord, StoredJob};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence collaborator for scraped jobs
///
/// The scraper only relies on `insert_job`; the remaining operations back the
/// CLI's reporting modes.
pub trait JobStore {
    /// Stores one job, stamping it with the current time
    ///
    /// # Returns
    ///
    /// The row ID of the stored job
    fn insert_job(&mut self, job: &Job) -> StorageResult<i64>;

    /// Counts all stored jobs
    fn count_jobs(&self) -> StorageResult<u64>;

    /// Gets the most recently stored jobs, newest first
    fn recent_jobs(&self, limit: usize) -> StorageResult<Vec<StoredJob>>;

    /// Records the outcome of one scrape invocation
    fn record_run(&mut self, outcome: &RunOutcome) -> StorageResult<i64>;

    /// Gets the most recent scrape runs, newest first
    fn recent_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>>;
}
