//! Integration tests for the scraper
//!
//! These tests use wiremock as the outbound proxy: requests for the target
//! site arrive at the mock server in absolute form and are answered there.

mod scrape_tests;
mod support;
