use serde::Deserialize;

/// Environment variable that overrides `[proxy] url`
pub const PROXY_URL_ENV: &str = "PROXY_URL";

/// Main configuration structure for remote-jobs
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub target: TargetConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Applies environment overrides on top of the file values
    ///
    /// A non-empty `PROXY_URL` replaces whatever the file set for the proxy.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var(PROXY_URL_ENV) {
            self.proxy.apply_override(Some(value));
        }
    }
}

/// Outbound proxy configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProxyConfig {
    /// Proxy endpoint every request is routed through
    pub url: Option<String>,
}

impl ProxyConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
        }
    }

    /// Returns the configured proxy URL, treating blank values as absent
    pub fn endpoint(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    fn apply_override(&mut self, value: Option<String>) {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            self.url = Some(value);
        }
    }
}

/// Target site markup contract
///
/// These values describe the external site and change whenever its markup
/// does, so they live in configuration rather than in parsing code.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// Page listing the remote jobs
    #[serde(default = "default_target_url")]
    pub url: String,

    /// Origin prefixed to relative job links
    #[serde(rename = "base-origin", default = "default_base_origin")]
    pub base_origin: String,

    /// CSS selector matching one job listing element
    #[serde(rename = "job-selector", default = "default_job_selector")]
    pub job_selector: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url: default_target_url(),
            base_origin: default_base_origin(),
            job_selector: default_job_selector(),
        }
    }
}

fn default_target_url() -> String {
    "https://unjobs.org/search/remote".to_string()
}

fn default_base_origin() -> String {
    "https://unjobs.org".to_string()
}

fn default_job_selector() -> String {
    ".job".to_string()
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// HTTP server configuration for `--serve`
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}
