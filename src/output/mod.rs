//! Output module for scrape reports
//!
//! This module handles:
//! - Statistics loaded from the job database (`--stats`)
//! - The summary printed after a one-shot scrape

pub mod stats;

pub use stats::{load_statistics, print_statistics, render_statistics, ScrapeStatistics};

use crate::job::Job;
use crate::storage::PersistReport;
use std::fmt::Write;

/// Renders the summary shown after a one-shot scrape
pub fn render_scrape_summary(jobs: &[Job], report: &PersistReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Scrape Summary ===\n");
    let _ = writeln!(out, "Jobs found: {}", jobs.len());
    let _ = writeln!(out, "Jobs stored: {}", report.stored);
    if report.failed > 0 {
        let _ = writeln!(out, "Jobs failed to store: {}", report.failed);
    }

    if !jobs.is_empty() {
        let _ = writeln!(out);
        for job in jobs {
            let _ = writeln!(out, "  - {}", job);
        }
    }

    out
}
