//! Integration tests for the collector
//!
//! These tests use wiremock for both the repository metadata API and the
//! InfluxDB write endpoint, and run the full pagination walk end-to-end.

use catalog_metrics::config::{Config, InfluxConfig, SourceConfig};
use catalog_metrics::{Collector, CollectorError, FetchError, WriteError};
use serde_json::{json, Value};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEED_PATH: &str = "/v2/repositories/ranchercharts";

/// Creates a test configuration pointing at the two mock servers
fn create_test_config(source: &MockServer, influx: &MockServer) -> Config {
    let address = influx.address();

    Config {
        source: SourceConfig {
            base_url: format!("{}/v2/repositories/", source.uri()),
            repository: "ranchercharts".to_string(),
            request_timeout: 5,
            max_retries: 3,
            retry_interval: 0,
            accept_invalid_certs: false,
        },
        influxdb: InfluxConfig {
            host: address.ip().to_string(),
            port: address.port(),
            ..InfluxConfig::default()
        },
    }
}

/// Collects formatted log output so tests can inspect emitted events
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn record(name: &str, pulls: i64) -> Value {
    json!({
        "user": "ranchercharts",
        "name": name,
        "namespace": "ranchercharts",
        "repository_type": "image",
        "status": 1,
        "description": "",
        "is_private": false,
        "is_automated": false,
        "can_edit": false,
        "star_count": 0,
        "pull_count": pulls,
        "last_updated": "2020-03-02T09:16:03.823817Z",
        "is_migrated": false
    })
}

fn page(next: Option<String>, results: Vec<Value>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "count": results.len(),
        "next": next,
        "previous": null,
        "results": results,
    }))
}

async fn mount_influx(influx: &MockServer, status: u16, expected_writes: u64) {
    Mock::given(method("POST"))
        .and(path("/write"))
        .and(query_param("db", "catalog"))
        .and(query_param("rp", "autogen"))
        .and(query_param("precision", "h"))
        .respond_with(ResponseTemplate::new(status))
        .expect(expected_writes)
        .mount(influx)
        .await;
}

async fn write_bodies(influx: &MockServer) -> Vec<String> {
    influx
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|request| String::from_utf8(request.body).expect("line protocol is UTF-8"))
        .collect()
}

#[tokio::test]
async fn test_follows_next_links_until_last_page() {
    let source = MockServer::start().await;
    let influx = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEED_PATH))
        .respond_with(page(
            Some(format!("{}/page2", source.uri())),
            vec![record("rancher-agent", 10), record("rancher-server", 20)],
        ))
        .expect(1)
        .mount(&source)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(page(None, vec![record("rancher-cli", 30)]))
        .expect(1)
        .mount(&source)
        .await;

    mount_influx(&influx, 204, 2).await;

    let collector = Collector::new(&create_test_config(&source, &influx)).unwrap();
    let summary = collector.run().await.expect("collection failed");

    assert_eq!(summary.pages, 2);
    assert_eq!(summary.points, 3);

    let bodies = write_bodies(&influx).await;
    assert_eq!(bodies.len(), 2);

    let first: Vec<&str> = bodies[0].lines().collect();
    assert_eq!(first.len(), 2);
    assert!(first[0].starts_with("repositories,name=rancher-agent,namespace=ranchercharts "));
    assert!(first[0].contains("pull_count=10i"));
    assert!(first[0].contains("is_private=false"));
    assert!(first[1].starts_with("repositories,name=rancher-server,namespace=ranchercharts "));

    let second: Vec<&str> = bodies[1].lines().collect();
    assert_eq!(second.len(), 1);
    assert!(second[0].contains("pull_count=30i"));
}

#[tokio::test]
async fn test_empty_terminal_page_completes_without_write() {
    let source = MockServer::start().await;
    let influx = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEED_PATH))
        .respond_with(page(Some(String::new()), vec![]))
        .expect(1)
        .mount(&source)
        .await;

    mount_influx(&influx, 204, 0).await;

    let collector = Collector::new(&create_test_config(&source, &influx)).unwrap();
    let summary = collector.run().await.expect("collection failed");

    assert_eq!(summary.pages, 1);
    assert_eq!(summary.points, 0);
}

#[tokio::test]
async fn test_bare_object_is_a_terminal_page() {
    let source = MockServer::start().await;
    let influx = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEED_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&source)
        .await;

    mount_influx(&influx, 204, 0).await;

    let collector = Collector::new(&create_test_config(&source, &influx)).unwrap();
    let summary = collector.run().await.expect("collection failed");

    assert_eq!(summary.pages, 1);
}

#[tokio::test]
async fn test_recovers_when_last_retry_succeeds() {
    let source = MockServer::start().await;
    let influx = MockServer::start().await;

    // Two server errors, then an undecodable body, then a real page
    Mock::given(method("GET"))
        .and(path(SEED_PATH))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&source)
        .await;

    Mock::given(method("GET"))
        .and(path(SEED_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>try later</html>"))
        .up_to_n_times(1)
        .mount(&source)
        .await;

    Mock::given(method("GET"))
        .and(path(SEED_PATH))
        .respond_with(page(None, vec![record("rancher-agent", 1)]))
        .mount(&source)
        .await;

    mount_influx(&influx, 204, 1).await;

    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer({
            let logs = logs.clone();
            move || logs.clone()
        })
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let collector = Collector::new(&create_test_config(&source, &influx)).unwrap();
    let summary = collector.run().await.expect("collection failed");

    assert_eq!(summary.pages, 1);
    assert_eq!(summary.points, 1);

    let requests = source.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 4);

    // One warning per failed attempt, numbered from 1
    let output = logs.contents();
    assert_eq!(output.matches("Failed to retrieve metadata").count(), 3);
    for attempt in 1..=3 {
        assert!(output.contains(&format!("attempt={}", attempt)), "{}", output);
    }
    assert!(!output.contains("attempt=4"));
}

#[tokio::test]
async fn test_aborts_after_retry_budget_is_exhausted() {
    let source = MockServer::start().await;
    let influx = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEED_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&source)
        .await;

    mount_influx(&influx, 204, 0).await;

    let collector = Collector::new(&create_test_config(&source, &influx)).unwrap();
    let result = collector.run().await;

    match result {
        Err(CollectorError::Fetch {
            attempts, source: FetchError::Status { status }, ..
        }) => {
            assert_eq!(attempts, 4);
            assert_eq!(status, 500);
        }
        other => panic!("expected fetch failure, got {:?}", other),
    }

    let requests = source.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 4);
}

#[tokio::test]
async fn test_failure_on_later_page_keeps_earlier_writes() {
    let source = MockServer::start().await;
    let influx = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEED_PATH))
        .respond_with(page(
            Some(format!("{}/page2", source.uri())),
            vec![record("rancher-agent", 1)],
        ))
        .mount(&source)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(4)
        .mount(&source)
        .await;

    mount_influx(&influx, 204, 1).await;

    let collector = Collector::new(&create_test_config(&source, &influx)).unwrap();
    let result = collector.run().await;

    assert!(matches!(
        result,
        Err(CollectorError::Fetch {
            source: FetchError::Decode(_),
            ..
        })
    ));
}

#[tokio::test]
async fn test_write_failure_aborts_without_retry() {
    let source = MockServer::start().await;
    let influx = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEED_PATH))
        .respond_with(page(
            Some(format!("{}/page2", source.uri())),
            vec![record("rancher-agent", 1)],
        ))
        .expect(1)
        .mount(&source)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(page(None, vec![record("rancher-cli", 2)]))
        .expect(0)
        .mount(&source)
        .await;

    mount_influx(&influx, 500, 1).await;

    let collector = Collector::new(&create_test_config(&source, &influx)).unwrap();
    let result = collector.run().await;

    match result {
        Err(CollectorError::Write {
            points,
            source: WriteError::Rejected { status, .. },
            ..
        }) => {
            assert_eq!(points, 1);
            assert_eq!(status, 500);
        }
        other => panic!("expected write failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_next_link_may_point_to_another_host() {
    let source = MockServer::start().await;
    let mirror = MockServer::start().await;
    let influx = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEED_PATH))
        .respond_with(page(
            Some(format!("{}/v2/repositories/ranchercharts/?page=2", mirror.uri())),
            vec![record("rancher-agent", 1)],
        ))
        .mount(&source)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/repositories/ranchercharts/"))
        .and(query_param("page", "2"))
        .respond_with(page(None, vec![record("rancher-cli", 2)]))
        .expect(1)
        .mount(&mirror)
        .await;

    mount_influx(&influx, 204, 2).await;

    let collector = Collector::new(&create_test_config(&source, &influx)).unwrap();
    let summary = collector.run().await.expect("collection failed");

    assert_eq!(summary.pages, 2);
    assert_eq!(summary.points, 2);
}

#[tokio::test]
async fn test_credentials_are_sent_to_the_store() {
    let source = MockServer::start().await;
    let influx = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEED_PATH))
        .respond_with(page(None, vec![record("rancher-agent", 1)]))
        .mount(&source)
        .await;

    Mock::given(method("POST"))
        .and(path("/write"))
        .and(query_param("u", "writer"))
        .and(query_param("p", "secret"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&influx)
        .await;

    let mut config = create_test_config(&source, &influx);
    config.influxdb.username = Some("writer".to_string());
    config.influxdb.password = Some("secret".to_string());

    let collector = Collector::new(&config).unwrap();
    collector.run().await.expect("collection failed");
}

#[tokio::test]
async fn test_zero_retries_fails_on_first_error() {
    let source = MockServer::start().await;
    let influx = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEED_PATH))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&source)
        .await;

    let collector = Collector::new(&create_test_config(&source, &influx))
        .unwrap()
        .with_retry_policy(catalog_metrics::collector::RetryPolicy::new(0, Duration::ZERO));

    let result = collector.run().await;
    assert!(matches!(result, Err(CollectorError::Fetch { attempts: 1, .. })));
}
