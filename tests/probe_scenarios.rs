//! End-to-end probe scenarios
//!
//! Each test runs the real HTTP prober through the coordinator against local
//! mock servers, so no external network access is needed.

use mirror_latency_tester::{
    coordinator::Coordinator,
    models::Config,
    prober::HttpProber,
    types::{Endpoint, Headers, ProbeResult},
};
use std::time::{Duration, Instant};
use wiremock::{matchers::method, Mock, MockServer, ResponseTemplate};

async fn server(status: u16, delay: Duration) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(status).set_delay(delay))
        .mount(&server)
        .await;
    server
}

fn endpoint(name: &str, server: &MockServer) -> Endpoint {
    Endpoint::parse(name, &server.uri()).unwrap()
}

/// Address on which nothing is listening
fn refused_endpoint(name: &str) -> Endpoint {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);
    Endpoint::parse(name, &format!("http://{}", address)).unwrap()
}

fn coordinator() -> Coordinator<HttpProber> {
    Coordinator::new(HttpProber::new().unwrap())
}

#[tokio::test]
async fn test_success_ranks_ahead_of_error_and_timeout() {
    let a = server(200, Duration::from_millis(10)).await;
    let b = server(500, Duration::from_millis(5)).await;
    let c = server(200, Duration::from_secs(5)).await;

    let endpoints = vec![endpoint("A", &a), endpoint("B", &b), endpoint("C", &c)];
    let report = coordinator()
        .run(&endpoints, Duration::from_secs(1), &Headers::new())
        .await;

    let names: Vec<&str> = report.entries.iter().map(|o| o.endpoint.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B", "C"]);

    assert!(report.entries[0].latency_ms().unwrap() >= 10.0);
    assert_eq!(report.entries[1].result, ProbeResult::Failure);
    assert_eq!(report.entries[2].result, ProbeResult::Failure);
    assert_eq!(report.recommendation().unwrap().name, "A");
}

#[tokio::test]
async fn test_all_refused_gives_no_recommendation() {
    let endpoints = vec![refused_endpoint("x"), refused_endpoint("y")];
    let report = coordinator()
        .run(&endpoints, Duration::from_secs(2), &Headers::new())
        .await;

    assert_eq!(report.len(), 2);
    assert_eq!(report.success_count(), 0);
    assert!(report.recommendation().is_none());
    // Failures keep their input order
    assert_eq!(report.entries[0].endpoint.name, "x");
    assert_eq!(report.entries[1].endpoint.name, "y");
}

#[tokio::test]
async fn test_redirect_status_is_accepted() {
    let a = server(301, Duration::from_millis(8)).await;

    let report = coordinator()
        .run(&[endpoint("A", &a)], Duration::from_secs(1), &Headers::new())
        .await;

    assert!(report.entries[0].is_success());
    assert_eq!(report.recommendation().unwrap().name, "A");
}

#[tokio::test]
async fn test_slow_server_fails_within_timeout() {
    let slow = server(200, Duration::from_secs(10)).await;

    let started = Instant::now();
    let report = coordinator()
        .run(&[endpoint("slow", &slow)], Duration::from_millis(500), &Headers::new())
        .await;

    assert_eq!(report.entries[0].result, ProbeResult::Failure);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_every_endpoint_reported_once_in_rank_order() {
    let fast = server(204, Duration::from_millis(5)).await;
    let medium = server(200, Duration::from_millis(60)).await;
    let slow = server(302, Duration::from_millis(150)).await;
    let missing = server(404, Duration::ZERO).await;

    let endpoints = vec![
        refused_endpoint("refused"),
        endpoint("slow", &slow),
        endpoint("missing", &missing),
        endpoint("medium", &medium),
        endpoint("fast", &fast),
    ];

    let report = coordinator()
        .run(&endpoints, Duration::from_secs(2), &Headers::new())
        .await;

    assert_eq!(report.len(), endpoints.len());
    let names: Vec<&str> = report.entries.iter().map(|o| o.endpoint.name.as_str()).collect();
    assert_eq!(names, vec!["fast", "medium", "slow", "refused", "missing"]);

    let latencies: Vec<f64> = report.entries.iter().filter_map(|o| o.latency_ms()).collect();
    assert!(latencies.iter().all(|&ms| ms >= 0.0));
    assert!(latencies.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_probes_run_concurrently() {
    let mut servers = Vec::new();
    for _ in 0..4 {
        servers.push(server(200, Duration::from_millis(300)).await);
    }
    let endpoints: Vec<Endpoint> = servers
        .iter()
        .enumerate()
        .map(|(i, s)| endpoint(&format!("m{}", i), s))
        .collect();

    let started = Instant::now();
    let report = coordinator()
        .run(&endpoints, Duration::from_secs(5), &Headers::new())
        .await;

    assert_eq!(report.success_count(), 4);
    // Sequential probing would need at least 1.2s
    assert!(started.elapsed() < Duration::from_millis(1000), "{:?}", started.elapsed());
}

#[tokio::test]
async fn test_user_agent_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(wiremock::matchers::header("User-Agent", "mirror-check/1.0"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut headers = Headers::new();
    headers.insert("User-Agent".to_string(), "mirror-check/1.0".to_string());

    let with = coordinator()
        .run(&[endpoint("ua", &server)], Duration::from_secs(2), &headers)
        .await;
    assert!(with.entries[0].is_success());

    // Unmatched requests get 404 from the mock server
    let without = coordinator()
        .run(&[endpoint("ua", &server)], Duration::from_secs(2), &Headers::new())
        .await;
    assert!(!without.entries[0].is_success());
}

#[tokio::test]
async fn test_configured_user_agent_in_other_case_replaces_default() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(wiremock::matchers::header("user-agent", "custom/1.0"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let config = Config {
        extra_headers: vec![("USER-AGENT".to_string(), "custom/1.0".to_string())],
        ..Default::default()
    };

    let report = coordinator()
        .run(&[endpoint("ua", &server)], Duration::from_secs(2), &config.headers())
        .await;
    assert!(report.entries[0].is_success());
}
