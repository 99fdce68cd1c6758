//! Statistics generation from the job database
//!
//! This module provides functionality for extracting and displaying
//! scrape statistics from the storage layer.

use crate::storage::{JobStore, RunRecord, RunStatus, StorageResult, StoredJob};
use std::fmt::Write;

/// Scrape statistics summary
#[derive(Debug, Clone)]
pub struct ScrapeStatistics {
    /// Total number of stored jobs
    pub total_jobs: u64,

    /// Most recently stored jobs, newest first
    pub recent_jobs: Vec<StoredJob>,

    /// Most recent scrape runs, newest first
    pub recent_runs: Vec<RunRecord>,
}

impl ScrapeStatistics {
    /// Share of the listed runs that succeeded, in percent
    pub fn success_rate(&self) -> f64 {
        if self.recent_runs.is_empty() {
            return 0.0;
        }
        let succeeded = self
            .recent_runs
            .iter()
            .filter(|run| run.status == RunStatus::Succeeded)
            .count();
        (succeeded as f64 / self.recent_runs.len() as f64) * 100.0
    }
}

/// Loads statistics from storage
///
/// `limit` caps both the recent job and recent run lists.
pub fn load_statistics(store: &dyn JobStore, limit: usize) -> StorageResult<ScrapeStatistics> {
    Ok(ScrapeStatistics {
        total_jobs: store.count_jobs()?,
        recent_jobs: store.recent_jobs(limit)?,
        recent_runs: store.recent_runs(limit)?,
    })
}

/// Renders statistics as a plain-text report
pub fn render_statistics(stats: &ScrapeStatistics) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Scrape Statistics ===\n");
    let _ = writeln!(out, "Overview:");
    let _ = writeln!(out, "  Total jobs stored: {}", stats.total_jobs);
    let _ = writeln!(out);

    if !stats.recent_jobs.is_empty() {
        let _ = writeln!(out, "Recent Jobs ({}):", stats.recent_jobs.len());
        for job in &stats.recent_jobs {
            let title = if job.title.is_empty() {
                "(untitled)"
            } else {
                job.title.as_str()
            };
            let _ = writeln!(out, "  - [{}] {} <{}>", job.scraped_at, title, job.link);
        }
        let _ = writeln!(out);
    }

    if !stats.recent_runs.is_empty() {
        let _ = writeln!(out, "Recent Runs ({}):", stats.recent_runs.len());
        for run in &stats.recent_runs {
            let _ = write!(
                out,
                "  #{} {} {} found={} stored={}",
                run.id,
                run.started_at,
                run.status.to_db_string(),
                run.jobs_found,
                run.jobs_stored
            );
            if let Some(error) = &run.error {
                let _ = write!(out, " error=\"{}\"", error);
            }
            let _ = writeln!(out);
        }
        let _ = writeln!(out);

        let _ = writeln!(
            out,
            "Success Rate: {:.1}% over the last {} runs",
            stats.success_rate(),
            stats.recent_runs.len()
        );
    }

    out
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &ScrapeStatistics) {
    print!("{}", render_statistics(stats));
}
