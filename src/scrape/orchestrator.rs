//! Scrape orchestration
//!
//! A [`Scraper`] owns everything one scrape needs: the proxied client, the
//! target description, the parser and the retry policy. It is built once at
//! startup and can serve any number of scrapes, concurrently if needed.

use crate::config::{Config, TargetConfig};
use crate::job::Job;
use crate::scrape::client::build_http_client;
use crate::scrape::fetcher::{fetch_once, RetryPolicy, RetryingFetcher, Sleeper, TokioSleeper};
use crate::scrape::parser::JobParser;
use crate::ScrapeError;
use reqwest::Client;
use tokio_util::sync::CancellationToken;

/// Reusable scraping context
#[derive(Debug, Clone)]
pub struct Scraper<S = TokioSleeper> {
    client: Client,
    target: TargetConfig,
    parser: JobParser,
    fetcher: RetryingFetcher<S>,
}

impl Scraper<TokioSleeper> {
    /// Creates a scraper with the default retry policy
    ///
    /// # Errors
    ///
    /// Returns `ScrapeError::Configuration` if the proxy is missing or
    /// invalid, or if the job selector does not compile. Nothing is sent
    /// over the network in that case.
    pub fn new(config: &Config) -> Result<Self, ScrapeError> {
        Self::with_sleeper(config, RetryPolicy::default(), TokioSleeper)
    }
}

impl<S: Sleeper> Scraper<S> {
    /// Creates a scraper with an explicit retry policy and sleeper
    pub fn with_sleeper(
        config: &Config,
        policy: RetryPolicy,
        sleeper: S,
    ) -> Result<Self, ScrapeError> {
        let client = build_http_client(&config.proxy)?;
        Self::from_client(client, config.target.clone(), policy, sleeper)
    }

    /// Creates a scraper around an already-built client
    pub fn from_client(
        client: Client,
        target: TargetConfig,
        policy: RetryPolicy,
        sleeper: S,
    ) -> Result<Self, ScrapeError> {
        let parser = JobParser::new(&target)?;

        Ok(Self {
            client,
            target,
            parser,
            fetcher: RetryingFetcher::with_sleeper(policy, sleeper),
        })
    }

    pub fn target(&self) -> &TargetConfig {
        &self.target
    }

    pub fn policy(&self) -> &RetryPolicy {
        self.fetcher.policy()
    }

    /// Scrapes the target's job listing with retries
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Job>)` - Jobs of the first successful attempt, in page order
    /// * `Err(ScrapeError::RetryExhausted)` - Every attempt failed
    /// * `Err(ScrapeError::Cancelled)` - `cancel` fired before completion
    pub async fn scrape_jobs(&self, cancel: &CancellationToken) -> Result<Vec<Job>, ScrapeError> {
        self.fetcher
            .run(
                |_| fetch_once(&self.client, &self.target, &self.parser),
                cancel,
            )
            .await
    }
}

/// Builds a scraper from `config` and runs a single scrape
///
/// Client construction happens first; a configuration failure is returned
/// before any attempt is made.
///
/// # Example
///
/// ```no_run
/// use remote_jobs::config::load_config;
/// use remote_jobs::scrape_jobs;
/// use std::path::Path;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let jobs = scrape_jobs(&config, &CancellationToken::new()).await?;
/// println!("{} jobs", jobs.len());
/// # Ok(())
/// # }
/// ```
pub async fn scrape_jobs(
    config: &Config,
    cancel: &CancellationToken,
) -> Result<Vec<Job>, ScrapeError> {
    let scraper = Scraper::new(config)?;
    scraper.scrape_jobs(cancel).await
}
