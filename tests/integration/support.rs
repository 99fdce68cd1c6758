use remote_jobs::config::{Config, OutputConfig, ProxyConfig, ServerConfig, TargetConfig};
use remote_jobs::scrape::{RetryPolicy, Sleeper};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TARGET_URL: &str = "http://unjobs.test/search/remote";
pub const TARGET_PATH: &str = "/search/remote";

pub const TWO_JOBS_HTML: &str = r#"<html><body>
    <div class="job"><a href="/job/123">Programme Officer</a></div>
    <div class="job"><a href="https://careers.example.org/456">Data Analyst</a></div>
</body></html>"#;

pub const NO_JOBS_HTML: &str = r#"<html><body><p>No vacancies</p></body></html>"#;

/// Configuration routing the target through `proxy_uri`
pub fn test_config(proxy_uri: Option<String>, db_path: &str) -> Config {
    Config {
        proxy: ProxyConfig { url: proxy_uri },
        target: TargetConfig {
            url: TARGET_URL.to_string(),
            ..TargetConfig::default()
        },
        output: OutputConfig {
            database_path: db_path.to_string(),
        },
        server: ServerConfig::default(),
    }
}

/// Retry policy with millisecond backoff for real-sleeper tests
pub fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        max_jitter: Duration::from_millis(1),
    }
}

/// Records requested waits without sleeping
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    waits: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        self.waits.lock().unwrap().push(duration);
        std::future::ready(())
    }
}
