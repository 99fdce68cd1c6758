//! remote-jobs main entry point
//!
//! This is the command-line interface for the remote-jobs scraper.

use chrono::Utc;
use clap::Parser;
use remote_jobs::config::{load_config_with_hash, Config};
use remote_jobs::output::{load_statistics, print_statistics, render_scrape_summary};
use remote_jobs::scrape::{ClientLimits, RetryPolicy, Scraper, BROWSER_USER_AGENT};
use remote_jobs::server::{serve, AppState};
use remote_jobs::storage::{open_storage, record_scrape};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// remote-jobs: scrape remote job listings through a proxy
///
/// Fetches the configured job board through the configured proxy, retrying
/// transient failures, and stores every listing found in a SQLite database.
#[derive(Parser, Debug)]
#[command(name = "remote-jobs")]
#[command(version = "1.0.0")]
#[command(about = "Scrape remote job listings through a proxy", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be scraped without any network access
    #[arg(long, conflicts_with_all = ["stats", "serve"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "serve"])]
    stats: bool,

    /// Serve GET /scrape-jobs over HTTP instead of scraping once
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    serve: bool,

    /// Number of jobs and runs listed by --stats
    #[arg(long, default_value_t = 10)]
    limit: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };
    config.apply_env_overrides();

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config, cli.limit)?;
    } else if cli.serve {
        handle_serve(&config).await?;
    } else {
        handle_scrape(&config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("remote_jobs=info,warn"),
            1 => EnvFilter::new("remote_jobs=debug,info"),
            2 => EnvFilter::new("remote_jobs=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Cancels the returned token on Ctrl-C
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling");
            trigger.cancel();
        }
    });
    token
}

/// Handles the --dry-run mode: shows the effective settings
fn handle_dry_run(config: &Config) {
    let limits = ClientLimits::default();
    let policy = RetryPolicy::default();

    println!("=== remote-jobs Dry Run ===\n");

    println!("Target:");
    println!("  URL: {}", config.target.url);
    println!("  Base origin: {}", config.target.base_origin);
    println!("  Job selector: {}", config.target.job_selector);
    println!("  User-Agent: {}", BROWSER_USER_AGENT);

    println!("\nProxy:");
    match config.proxy.endpoint() {
        Some(_) => println!("  configured"),
        None => println!("  NOT CONFIGURED (scraping will fail)"),
    }

    println!("\nClient:");
    println!("  Connect timeout: {:?}", limits.connect_timeout);
    println!("  Request timeout: {:?}", limits.request_timeout);
    println!("  Idle connections per host: {}", limits.max_idle_per_host);
    println!("  Idle timeout: {:?}", limits.idle_timeout);

    println!("\nRetry:");
    println!("  Max attempts: {}", policy.max_attempts);
    println!(
        "  Base delay: {:?} (doubling, plus jitter up to {:?})",
        policy.base_delay, policy.max_jitter
    );

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config, limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("Database: {}\n", config.output.database_path);

    let store = open_storage(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&store, limit)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --serve mode
async fn handle_serve(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr: SocketAddr = config.server.bind.parse()?;

    let store = open_storage(Path::new(&config.output.database_path))?;

    let shutdown = cancel_on_ctrl_c();
    let state = Arc::new(AppState::new(config.clone(), store, shutdown.clone()));

    serve(addr, state, shutdown).await?;
    tracing::info!("Server stopped");
    Ok(())
}

/// Handles the default mode: scrape once and store the jobs
async fn handle_scrape(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_storage(Path::new(&config.output.database_path))?;
    let started_at = Utc::now();

    let result = match Scraper::new(config) {
        Ok(scraper) => scraper.scrape_jobs(&cancel_on_ctrl_c()).await,
        Err(e) => Err(e),
    };

    let report = record_scrape(&mut store, started_at, &result);

    match result {
        Ok(jobs) => {
            print!("{}", render_scrape_summary(&jobs, &report));
            Ok(())
        }
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            Err(e.into())
        }
    }
}
