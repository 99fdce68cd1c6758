//! Configuration module for remote-jobs
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use remote_jobs::config::load_config;
//! use std::path::Path;
//!
//! let mut config = load_config(Path::new("config.toml")).unwrap();
//! config.apply_env_overrides();
//! println!("Scraping {}", config.target.url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, OutputConfig, ProxyConfig, ServerConfig, TargetConfig, PROXY_URL_ENV};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
