//! Storage module for persisting scraped jobs
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Job persistence with storage-assigned timestamps
//! - Scrape run tracking for the `--stats` report

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteJobStore;
pub use traits::{JobStore, StorageError, StorageResult};

use crate::job::Job;
use crate::ScrapeError;
use chrono::{DateTime, Utc};
use std::path::Path;

/// Initializes or opens a job database
pub fn open_storage(path: &Path) -> StorageResult<SqliteJobStore> {
    SqliteJobStore::new(path)
}

/// A job as stored in the database
#[derive(Debug, Clone, PartialEq)]
pub struct StoredJob {
    pub id: i64,
    pub title: String,
    pub link: String,
    pub scraped_at: String,
}

/// Final status of a scrape run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Succeeded,
    Failed,
    Cancelled,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "succeeded" => Some(Self::Succeeded),
            "failed" => Some(Self::Failed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Outcome of one scrape invocation, ready to be recorded
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub started_at: DateTime<Utc>,
    pub status: RunStatus,
    pub jobs_found: usize,
    pub jobs_stored: usize,
    pub error: Option<String>,
}

/// A recorded scrape run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: String,
    pub status: RunStatus,
    pub jobs_found: u64,
    pub jobs_stored: u64,
    pub error: Option<String>,
}

/// Result of handing a batch of jobs to a store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistReport {
    pub stored: usize,
    pub failed: usize,
}

/// Inserts every job, logging and skipping the ones that fail
///
/// A failed insert never stops the remaining jobs from being stored.
pub fn persist_jobs(store: &mut dyn JobStore, jobs: &[Job]) -> PersistReport {
    let mut report = PersistReport::default();

    for job in jobs {
        match store.insert_job(job) {
            Ok(_) => report.stored += 1,
            Err(e) => {
                tracing::error!("Failed to insert job {}: {}", job, e);
                report.failed += 1;
            }
        }
    }

    tracing::info!(
        "Stored {} of {} jobs ({} failed)",
        report.stored,
        jobs.len(),
        report.failed
    );
    report
}

/// Persists a scrape result and records the run
///
/// Jobs are stored only on success. A failure to record the run is logged
/// and never replaces the scrape's own outcome.
pub fn record_scrape(
    store: &mut dyn JobStore,
    started_at: DateTime<Utc>,
    result: &Result<Vec<Job>, ScrapeError>,
) -> PersistReport {
    let (report, outcome) = match result {
        Ok(jobs) => {
            let report = persist_jobs(store, jobs);
            let outcome = RunOutcome {
                started_at,
                status: RunStatus::Succeeded,
                jobs_found: jobs.len(),
                jobs_stored: report.stored,
                error: None,
            };
            (report, outcome)
        }
        Err(e) => {
            let status = match e {
                ScrapeError::Cancelled => RunStatus::Cancelled,
                _ => RunStatus::Failed,
            };
            let outcome = RunOutcome {
                started_at,
                status,
                jobs_found: 0,
                jobs_stored: 0,
                error: Some(e.to_string()),
            };
            (PersistReport::default(), outcome)
        }
    };

    if let Err(e) = store.record_run(&outcome) {
        tracing::error!("Failed to record scrape run: {}", e);
    }
    report
}
