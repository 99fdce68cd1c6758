use crate::support::{
    fast_policy, test_config, RecordingSleeper, NO_JOBS_HTML, TARGET_PATH, TWO_JOBS_HTML,
};
use remote_jobs::scrape::{RetryPolicy, Scraper, BROWSER_ACCEPT, BROWSER_USER_AGENT};
use remote_jobs::{scrape_jobs, ConfigError, Job, ScrapeError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

async fn received(mock_server: &MockServer) -> usize {
    mock_server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or(0)
}

#[tokio::test]
async fn test_scrape_through_proxy() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(TARGET_PATH))
        .and(header("user-agent", BROWSER_USER_AGENT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(TWO_JOBS_HTML)
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = test_config(Some(mock_server.uri()), "./unused.db");
    let jobs = scrape_jobs(&config, &CancellationToken::new())
        .await
        .expect("Scrape failed");

    assert_eq!(
        jobs,
        vec![
            Job::new("Programme Officer", "https://unjobs.org/job/123"),
            Job::new("Data Analyst", "https://careers.example.org/456"),
        ]
    );
}

/// All values sent for `name`, split on commas the way wiremock stores them
fn header_values(request: &Request, name: &str) -> Vec<String> {
    request
        .headers
        .iter()
        .filter(|(header_name, _)| header_name.as_str().eq_ignore_ascii_case(name))
        .flat_map(|(_, values)| values.iter().map(|value| value.as_str().trim().to_string()))
        .collect()
}

#[tokio::test]
async fn test_request_carries_browser_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(TARGET_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(NO_JOBS_HTML))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = test_config(Some(mock_server.uri()), "./unused.db");
    scrape_jobs(&config, &CancellationToken::new())
        .await
        .expect("Scrape failed");

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];

    assert_eq!(header_values(request, "user-agent"), vec![BROWSER_USER_AGENT]);
    assert_eq!(
        header_values(request, "accept"),
        BROWSER_ACCEPT.split(',').collect::<Vec<_>>()
    );
    assert_eq!(header_values(request, "connection"), vec!["keep-alive"]);
}

#[tokio::test]
async fn test_empty_listing_is_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(TARGET_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(NO_JOBS_HTML))
        .mount(&mock_server)
        .await;

    let sleeper = RecordingSleeper::default();
    let config = test_config(Some(mock_server.uri()), "./unused.db");
    let scraper = Scraper::with_sleeper(&config, RetryPolicy::default(), sleeper.clone()).unwrap();

    let jobs = scraper.scrape_jobs(&CancellationToken::new()).await.unwrap();

    assert!(jobs.is_empty());
    assert!(sleeper.waits().is_empty());
    assert_eq!(received(&mock_server).await, 1);
}

#[tokio::test]
async fn test_status_500_exhausts_retries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(TARGET_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let sleeper = RecordingSleeper::default();
    let config = test_config(Some(mock_server.uri()), "./unused.db");
    let scraper = Scraper::with_sleeper(&config, RetryPolicy::default(), sleeper.clone()).unwrap();

    let result = scraper.scrape_jobs(&CancellationToken::new()).await;

    match result {
        Err(ScrapeError::RetryExhausted { attempts, source }) => {
            assert_eq!(attempts, 3);
            assert!(matches!(*source, ScrapeError::HttpStatus { status: 500, .. }));
        }
        other => panic!("expected RetryExhausted, got {:?}", other),
    }

    assert_eq!(received(&mock_server).await, 3);

    let waits = sleeper.waits();
    assert_eq!(waits.len(), 2);
    assert!(waits[0] >= Duration::from_secs(1) && waits[0] < Duration::from_secs(2));
    assert!(waits[1] >= Duration::from_secs(2) && waits[1] < Duration::from_secs(3));
}

#[tokio::test]
async fn test_non_200_success_status_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(TARGET_PATH))
        .respond_with(ResponseTemplate::new(204))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(TARGET_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(TWO_JOBS_HTML))
        .mount(&mock_server)
        .await;

    let sleeper = RecordingSleeper::default();
    let config = test_config(Some(mock_server.uri()), "./unused.db");
    let scraper = Scraper::with_sleeper(&config, RetryPolicy::default(), sleeper.clone()).unwrap();

    let jobs = scraper.scrape_jobs(&CancellationToken::new()).await.unwrap();

    assert_eq!(jobs.len(), 2);
    assert_eq!(sleeper.waits().len(), 1);
}

#[tokio::test]
async fn test_transient_failure_then_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(TARGET_PATH))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(TARGET_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(TWO_JOBS_HTML))
        .expect(1)
        .mount(&mock_server)
        .await;

    let sleeper = RecordingSleeper::default();
    let config = test_config(Some(mock_server.uri()), "./unused.db");
    let scraper = Scraper::with_sleeper(&config, RetryPolicy::default(), sleeper.clone()).unwrap();

    let jobs = scraper.scrape_jobs(&CancellationToken::new()).await.unwrap();

    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].link, "https://unjobs.org/job/123");

    let waits = sleeper.waits();
    assert_eq!(waits.len(), 1);
    assert!(waits[0] >= Duration::from_secs(1) && waits[0] < Duration::from_secs(2));
}

#[tokio::test]
async fn test_missing_proxy_makes_no_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TWO_JOBS_HTML))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = test_config(None, "./unused.db");
    let result = scrape_jobs(&config, &CancellationToken::new()).await;

    assert!(matches!(
        result.unwrap_err(),
        ScrapeError::Configuration(ConfigError::ProxyNotConfigured)
    ));
    assert_eq!(received(&mock_server).await, 0);
}

#[tokio::test]
async fn test_unreachable_proxy_is_network_failure() {
    // Bind and immediately drop a listener so the port refuses connections
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let config = test_config(Some(format!("http://127.0.0.1:{}", port)), "./unused.db");
    let scraper =
        Scraper::with_sleeper(&config, fast_policy(), RecordingSleeper::default()).unwrap();

    let result = scraper.scrape_jobs(&CancellationToken::new()).await;

    match result {
        Err(ScrapeError::RetryExhausted { attempts, source }) => {
            assert_eq!(attempts, 3);
            assert!(matches!(*source, ScrapeError::Network { .. }));
        }
        other => panic!("expected RetryExhausted, got {:?}", other),
    }
}

#[tokio::test]
async fn test_cancel_stops_backoff() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(TARGET_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let config = test_config(Some(mock_server.uri()), "./unused.db");
    let scraper = Scraper::new(&config).unwrap();
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let result = scraper.scrape_jobs(&cancel).await;

    assert!(matches!(result, Err(ScrapeError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(received(&mock_server).await, 1);
}
