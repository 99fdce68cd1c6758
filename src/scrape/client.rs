//! Proxied HTTP client construction
//!
//! Every request the scraper makes goes through the configured proxy. The
//! client built here is cheap to clone and is shared by all attempts of a
//! scrape (and by concurrent scrapes in server mode).

use crate::config::ProxyConfig;
use crate::ConfigError;
use reqwest::{Client, Proxy};
use std::time::Duration;
use url::Url;

/// Fixed resource limits for the scraping client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientLimits {
    /// TCP connect timeout; also bounds the TLS handshake
    pub connect_timeout: Duration,
    /// TCP keep-alive interval
    pub tcp_keepalive: Duration,
    /// Idle connections kept per host
    pub max_idle_per_host: usize,
    /// How long an idle pooled connection is kept
    pub idle_timeout: Duration,
    /// Overall per-request timeout
    pub request_timeout: Duration,
}

impl Default for ClientLimits {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            tcp_keepalive: Duration::from_secs(10),
            max_idle_per_host: 10,
            idle_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Builds an HTTP client that routes every request through the proxy
///
/// # Errors
///
/// * `ConfigError::ProxyNotConfigured` - no proxy URL was configured
/// * `ConfigError::InvalidProxyUrl` - the proxy URL does not parse
/// * `ConfigError::Client` - reqwest rejected the client settings
///
/// No network activity happens here; failures are purely local.
///
/// # Example
///
/// ```no_run
/// use remote_jobs::config::ProxyConfig;
/// use remote_jobs::scrape::build_http_client;
///
/// let proxy = ProxyConfig::new("http://proxy.example:8080");
/// let client = build_http_client(&proxy).unwrap();
/// ```
pub fn build_http_client(proxy: &ProxyConfig) -> Result<Client, ConfigError> {
    build_http_client_with_limits(proxy, ClientLimits::default())
}

/// Same as [`build_http_client`] with explicit limits
pub fn build_http_client_with_limits(
    proxy: &ProxyConfig,
    limits: ClientLimits,
) -> Result<Client, ConfigError> {
    let proxy_url = parse_proxy_url(proxy)?;

    let proxy = Proxy::all(proxy_url.as_str()).map_err(|e| ConfigError::InvalidProxyUrl {
        url: proxy_url.to_string(),
        reason: e.to_string(),
    })?;

    tracing::debug!("Routing requests through proxy {}", redact(&proxy_url));

    Client::builder()
        .proxy(proxy)
        .connect_timeout(limits.connect_timeout)
        .tcp_keepalive(limits.tcp_keepalive)
        .pool_max_idle_per_host(limits.max_idle_per_host)
        .pool_idle_timeout(limits.idle_timeout)
        .timeout(limits.request_timeout)
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(|e| ConfigError::Client(e.to_string()))
}

/// Resolves the configured proxy into a parsed URL
fn parse_proxy_url(proxy: &ProxyConfig) -> Result<Url, ConfigError> {
    let raw = proxy.endpoint().ok_or(ConfigError::ProxyNotConfigured)?;

    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidProxyUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if !url.has_host() {
        return Err(ConfigError::InvalidProxyUrl {
            url: raw.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(url)
}

/// Strips credentials from a proxy URL before it is logged
fn redact(url: &Url) -> String {
    let mut shown = url.clone();
    if !shown.username().is_empty() {
        let _ = shown.set_username("***");
    }
    if shown.password().is_some() {
        let _ = shown.set_password(Some("***"));
    }
    shown.to_string()
}
