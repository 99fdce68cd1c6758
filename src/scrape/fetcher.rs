//! HTTP fetcher and retry loop
//!
//! This module handles the requests made against the target site:
//! - A single GET attempt with the fixed browser-like headers
//! - Status validation (only 200 is accepted)
//! - The bounded retry loop with exponential backoff and jitter
//!
//! # Retry Logic
//!
//! | Condition | Action |
//! |-----------|--------|
//! | Network/timeout error | Retry after backoff |
//! | Any non-200 status | Retry after backoff |
//! | Body could not be read | Retry after backoff |
//! | Last attempt failed | `RetryExhausted` with the last cause |
//! | Token cancelled | `Cancelled` immediately |

use crate::config::TargetConfig;
use crate::job::Job;
use crate::scrape::parser::JobParser;
use crate::ScrapeError;
use rand::Rng;
use reqwest::header::{ACCEPT, CONNECTION, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// User-Agent sent with every request
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

/// Accept header sent with every request
pub const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml";

/// Retry configuration for the scrape loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Backoff for attempt 0; doubled for every following attempt
    pub base_delay: Duration,
    /// Upper bound (exclusive) of the random jitter added to each backoff
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_jitter: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Calculates the wait after a failed attempt
    ///
    /// With the default policy the result lies in `[2^attempt, 2^attempt + 1)`
    /// seconds.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let base = self.base_delay.saturating_mul(2u32.saturating_pow(attempt));
        base.saturating_add(self.jitter())
    }

    fn jitter(&self) -> Duration {
        let max_nanos = u64::try_from(self.max_jitter.as_nanos()).unwrap_or(u64::MAX);
        if max_nanos == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos(rand::thread_rng().gen_range(0..max_nanos))
    }
}

/// Waits out a backoff delay
///
/// The retry loop only ever waits through this trait, so tests can observe
/// the waits without spending real time.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

/// Drives attempts through the retry policy
#[derive(Debug, Clone)]
pub struct RetryingFetcher<S = TokioSleeper> {
    policy: RetryPolicy,
    sleeper: S,
}

impl RetryingFetcher<TokioSleeper> {
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_sleeper(policy, TokioSleeper)
    }
}

impl<S: Sleeper> RetryingFetcher<S> {
    pub fn with_sleeper(policy: RetryPolicy, sleeper: S) -> Self {
        Self { policy, sleeper }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Runs `attempt` until it succeeds or the policy is exhausted
    ///
    /// `attempt` receives the zero-based attempt index. Attempt failures are
    /// logged and followed by a backoff wait unless no attempts remain.
    /// Cancelling `cancel` aborts both in-flight attempts and backoff waits.
    pub async fn run<F, Fut>(
        &self,
        mut attempt: F,
        cancel: &CancellationToken,
    ) -> Result<Vec<Job>, ScrapeError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<Vec<Job>, ScrapeError>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut index = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(ScrapeError::Cancelled);
            }

            let outcome = tokio::select! {
                _ = cancel.cancelled() => return Err(ScrapeError::Cancelled),
                outcome = attempt(index) => outcome,
            };

            let error = match outcome {
                Ok(jobs) => {
                    if index > 0 {
                        tracing::info!("Attempt {} succeeded after earlier failures", index + 1);
                    }
                    return Ok(jobs);
                }
                Err(error) if error.is_attempt_error() => error,
                Err(error) => return Err(error),
            };

            tracing::warn!("Attempt {} failed: {}", index + 1, error);

            if index + 1 >= max_attempts {
                return Err(ScrapeError::RetryExhausted {
                    attempts: max_attempts,
                    source: Box::new(error),
                });
            }

            let delay = self.policy.backoff(index);
            tracing::debug!("Backing off for {:.2}s", delay.as_secs_f64());

            tokio::select! {
                _ = cancel.cancelled() => return Err(ScrapeError::Cancelled),
                _ = self.sleeper.sleep(delay) => {}
            }

            index += 1;
        }
    }
}

/// Performs one request against the target and parses the listing
///
/// Returns `Network` or `HttpStatus` when the request fails and `Parse` when
/// the body cannot be read; all of them are attempt-level errors for
/// [`RetryingFetcher::run`].
pub async fn fetch_once(
    client: &Client,
    target: &TargetConfig,
    parser: &JobParser,
) -> Result<Vec<Job>, ScrapeError> {
    tracing::info!("Sending request to {}", target.url);

    let response = client
        .get(&target.url)
        .header(USER_AGENT, BROWSER_USER_AGENT)
        .header(ACCEPT, BROWSER_ACCEPT)
        .header(CONNECTION, "keep-alive")
        .send()
        .await
        .map_err(|source| ScrapeError::Network {
            url: target.url.clone(),
            source,
        })?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(ScrapeError::HttpStatus {
            url: target.url.clone(),
            status: status.as_u16(),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| ScrapeError::Parse(format!("failed to read response body: {}", e)))?;

    Ok(parser.parse(&body))
}
