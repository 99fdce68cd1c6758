//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the JobStore trait.

use crate::job::Job;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{JobStore, StorageError, StorageResult};
use crate::storage::{RunOutcome, RunRecord, RunStatus, StoredJob};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;

/// SQLite job store
pub struct SqliteJobStore {
    conn: Connection,
}

impl SqliteJobStore {
    /// Opens (or creates) the database at `path` and ensures the schema exists
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn sql_limit(limit: usize) -> StorageResult<i64> {
    i64::try_from(limit).map_err(|_| StorageError::Database(format!("limit {} too large", limit)))
}

impl JobStore for SqliteJobStore {
    fn insert_job(&mut self, job: &Job) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO jobs (title, link, scraped_at) VALUES (?1, ?2, ?3)",
            params![job.title, job.link, now],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn count_jobs(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM jobs", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn recent_jobs(&self, limit: usize) -> StorageResult<Vec<StoredJob>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, link, scraped_at FROM jobs ORDER BY id DESC LIMIT ?1",
        )?;

        let jobs = stmt
            .query_map(params![sql_limit(limit)?], |row| {
                Ok(StoredJob {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    link: row.get(2)?,
                    scraped_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(jobs)
    }

    fn record_run(&mut self, outcome: &RunOutcome) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO scrape_runs (started_at, finished_at, status, jobs_found, jobs_stored, error)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                outcome.started_at.to_rfc3339(),
                now,
                outcome.status.to_db_string(),
                outcome.jobs_found as i64,
                outcome.jobs_stored as i64,
                outcome.error,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn recent_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, started_at, finished_at, status, jobs_found, jobs_stored, error
             FROM scrape_runs ORDER BY id DESC LIMIT ?1",
        )?;

        let runs = stmt
            .query_map(params![sql_limit(limit)?], |row| {
                Ok(RunRecord {
                    id: row.get(0)?,
                    started_at: row.get(1)?,
                    finished_at: row.get(2)?,
                    status: RunStatus::from_db_string(&row.get::<_, String>(3)?)
                        .unwrap_or(RunStatus::Failed),
                    jobs_found: row.get::<_, i64>(4)? as u64,
                    jobs_stored: row.get::<_, i64>(5)? as u64,
                    error: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(runs)
    }
}
