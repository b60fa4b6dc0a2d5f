//! Integration tests for the write (PUT) workload.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use shortlink_loadtest::config::{RunConfig, Workload};
use shortlink_loadtest::worker::{run_concurrent, run_single};

fn config_for(server_uri: &str) -> RunConfig {
    RunConfig {
        workload: Workload::Write,
        read_url: server_uri.to_string(),
        write_url: format!("{}/", server_uri),
        timeout: Duration::from_secs(5),
    }
}

fn query_pairs(request: &wiremock::Request) -> HashMap<String, String> {
    request
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

#[tokio::test]
async fn write_run_sends_randomized_short_long_pairs() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(5)
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let summary = run_single(&client, &config_for(&server.uri()), 5).await;

    assert_eq!(summary.attempted(), 5);
    assert_eq!(summary.succeeded(), 5);
    // wiremock verifies the .expect() count when the server drops

    let requests = server
        .received_requests()
        .await
        .expect("request recording should be enabled");
    assert_eq!(requests.len(), 5);

    let mut shorts = HashSet::new();
    for request in &requests {
        let pairs = query_pairs(request);
        let short = pairs.get("short").expect("short param missing");
        let long = pairs.get("long").expect("long param missing");

        assert_eq!(short.len(), 10, "short was: {}", short);
        assert!(
            short.chars().all(|c| c.is_ascii_alphanumeric()),
            "short was: {}",
            short
        );

        assert!(
            long.starts_with("https://") && long.ends_with(".com"),
            "long was: {}",
            long
        );
        let stem = &long["https://".len()..long.len() - ".com".len()];
        assert_eq!(stem.len(), 10, "long was: {}", long);
        assert!(stem.chars().all(|c| c.is_ascii_alphanumeric()));

        shorts.insert(short.clone());
    }

    // Every request draws a fresh pair; no fixed placeholder values
    assert_eq!(shorts.len(), 5, "short keys should be distinct");
}

#[tokio::test]
async fn concurrent_write_run_issues_full_batch() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(6)
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let summary = run_concurrent(client, config_for(&server.uri()), 2, 3).await;

    assert_eq!(summary.attempted(), 6);
    assert_eq!(summary.succeeded(), 6);
    // wiremock verifies the .expect() count when the server drops
}
