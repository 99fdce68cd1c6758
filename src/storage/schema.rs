//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the remote-jobs database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Every scraped job listing, one row per insert
CREATE TABLE IF NOT EXISTS jobs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    link TEXT NOT NULL,
    scraped_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_jobs_scraped_at ON jobs(scraped_at);

-- One row per scrape invocation
CREATE TABLE IF NOT EXISTS scrape_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT NOT NULL,
    status TEXT NOT NULL,
    jobs_found INTEGER NOT NULL DEFAULT 0,
    jobs_stored INTEGER NOT NULL DEFAULT 0,
    error TEXT
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
