//! Scraping engine
//!
//! This module contains the core scraping logic, including:
//! - Proxied HTTP client construction
//! - Single-attempt fetching and the retry/backoff loop
//! - HTML parsing into job records
//! - The [`Scraper`] context tying them together

mod client;
mod fetcher;
mod orchestrator;
mod parser;

pub use client::{build_http_client, build_http_client_with_limits, ClientLimits};
pub use fetcher::{
    fetch_once, RetryPolicy, RetryingFetcher, Sleeper, TokioSleeper, BROWSER_ACCEPT,
    BROWSER_USER_AGENT,
};
pub use orchestrator::{scrape_jobs, Scraper};
pub use parser::JobParser;
