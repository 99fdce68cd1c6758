//! HTTP surface for on-demand scrapes
//!
//! Routes:
//! - `GET /` - liveness text
//! - `GET /scrape-jobs` - scrape the target, store the jobs, report the result

use crate::config::Config;
use crate::job::Job;
use crate::scrape::Scraper;
use crate::storage::{record_scrape, PersistReport, SqliteJobStore};
use crate::ScrapeError;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Shared state handed to every request
pub struct AppState {
    config: Config,
    scraper: Option<Scraper>,
    store: Mutex<SqliteJobStore>,
    shutdown: CancellationToken,
}

impl AppState {
    /// Creates the state, building the scraper from `config`
    ///
    /// A configuration the scraper cannot be built from does not stop the
    /// server; every `/scrape-jobs` request then reports the error.
    pub fn new(config: Config, store: SqliteJobStore, shutdown: CancellationToken) -> Self {
        let scraper = match Scraper::new(&config) {
            Ok(scraper) => Some(scraper),
            Err(e) => {
                tracing::warn!("Scraper unavailable, /scrape-jobs will fail: {}", e);
                None
            }
        };

        Self {
            config,
            scraper,
            store: Mutex::new(store),
            shutdown,
        }
    }

    /// Creates the state around an already-built scraper
    pub fn with_scraper(
        config: Config,
        scraper: Scraper,
        store: SqliteJobStore,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            config,
            scraper: Some(scraper),
            store: Mutex::new(store),
            shutdown,
        }
    }

    async fn scrape(&self) -> Result<Vec<Job>, ScrapeError> {
        let cancel = self.shutdown.child_token();
        match &self.scraper {
            Some(scraper) => scraper.scrape_jobs(&cancel).await,
            None => Scraper::new(&self.config)?.scrape_jobs(&cancel).await,
        }
    }

    /// Persists a scrape result and records the run
    ///
    /// Runs synchronously so the store lock is never held across an await.
    fn record(
        &self,
        started_at: DateTime<Utc>,
        result: &Result<Vec<Job>, ScrapeError>,
    ) -> PersistReport {
        let mut store = self
            .store
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        record_scrape(&mut *store, started_at, result)
    }
}

/// Builds the router with all routes
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/scrape-jobs", get(scrape_jobs_handler))
        .with_state(state)
}

async fn index() -> &'static str {
    "remote-jobs scraper"
}

async fn scrape_jobs_handler(State(state): State<Arc<AppState>>) -> (StatusCode, String) {
    let started_at = Utc::now();
    let result = state.scrape().await;

    let report = state.record(started_at, &result);

    match result {
        Ok(jobs) => {
            tracing::info!(
                "Scrape request finished: {} found, {} stored",
                jobs.len(),
                report.stored
            );
            (StatusCode::OK, "Jobs stored successfully!".to_string())
        }
        Err(e) => {
            tracing::error!("Scrape request failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to scrape jobs: {}", e),
            )
        }
    }
}

/// Serves the router on `addr` until `shutdown` is cancelled
pub async fn serve(
    addr: SocketAddr,
    state: Arc<AppState>,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}
