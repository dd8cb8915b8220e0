//! Integration tests for the health monitor against a mock HTTP backend.
//!
//! Run with: cargo test --test integration

use std::time::Duration;

use health_monitor::config::Config;
use health_monitor::error::ProbeError;
use health_monitor::monitor::{poll_once, HealthMonitor, HealthStatus};
use health_monitor::probe::{HealthClient, HealthProbe, ProbeKind};
use health_monitor::view::HealthView;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HealthClient {
    let config = Config {
        health_api_base_url: server.uri(),
        ..Config::default()
    };
    HealthClient::new(&config).expect("client builds")
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

fn status_body(status: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "status": status }))
}

#[tokio::test]
async fn both_endpoints_up() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/health/live",
        ResponseTemplate::new(200).set_body_json(json!({"status": "UP", "uptime": "3m2s"})),
    )
    .await;
    mount(&server, "/health/ready", status_body("UP")).await;

    let snapshot = poll_once(&client_for(&server), 1).await;

    assert_eq!(snapshot.status, HealthStatus::probed(true, true));
    assert_eq!(
        snapshot.liveness.and_then(|body| body.uptime).as_deref(),
        Some("3m2s")
    );
}

#[tokio::test]
async fn liveness_down_readiness_up() {
    let server = MockServer::start().await;
    mount(&server, "/health/live", status_body("DOWN")).await;
    mount(&server, "/health/ready", status_body("UP")).await;

    let snapshot = poll_once(&client_for(&server), 1).await;

    assert_eq!(snapshot.status, HealthStatus::probed(false, true));
    assert_eq!(snapshot.status.error(), None);
}

#[tokio::test]
async fn readiness_503_is_the_error_state() {
    let server = MockServer::start().await;
    mount(&server, "/health/live", status_body("UP")).await;
    mount(
        &server,
        "/health/ready",
        ResponseTemplate::new(503).set_body_json(json!({
            "status": "DOWN",
            "checks": {"ready": {"status": "DOWN", "message": "Service is not ready"}}
        })),
    )
    .await;

    let client = client_for(&server);
    let err = client.check_readiness().await.unwrap_err();
    assert!(matches!(
        err,
        ProbeError::HttpStatus {
            kind: ProbeKind::Readiness,
            status: 503
        }
    ));

    let snapshot = poll_once(&client, 1).await;
    assert_eq!(snapshot.status, HealthStatus::failed());
    assert_eq!(snapshot.status.error(), Some("Failed to fetch health status"));
}

#[tokio::test]
async fn body_without_status_is_the_error_state() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/health/live",
        ResponseTemplate::new(200).set_body_json(json!({"uptime": "1s"})),
    )
    .await;
    mount(&server, "/health/ready", status_body("UP")).await;

    let client = client_for(&server);
    let err = client.check_liveness().await.unwrap_err();
    assert!(matches!(err, ProbeError::Payload { kind: ProbeKind::Liveness, .. }));

    let snapshot = poll_once(&client, 1).await;
    assert_eq!(snapshot.status, HealthStatus::failed());
}

#[tokio::test]
async fn non_json_body_is_the_error_state() {
    let server = MockServer::start().await;
    mount(&server, "/health/live", status_body("UP")).await;
    mount(
        &server,
        "/health/ready",
        ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"),
    )
    .await;

    let snapshot = poll_once(&client_for(&server), 1).await;

    assert_eq!(snapshot.status, HealthStatus::failed());
    assert!(HealthView::from_state(Some(&snapshot)).panels().is_none());
}

#[tokio::test]
async fn unreachable_backend_is_the_error_state() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let config = Config {
        health_api_base_url: uri,
        http_timeout_ms: Some(2000),
        ..Config::default()
    };
    let client = HealthClient::new(&config).expect("client builds");

    let err = client.check_liveness().await.unwrap_err();
    assert!(matches!(err, ProbeError::Transport { kind: ProbeKind::Liveness, .. }));

    let snapshot = poll_once(&client, 1).await;
    assert_eq!(snapshot.status, HealthStatus::failed());
}

#[tokio::test]
async fn monitor_publishes_first_cycle_from_http_backend() {
    let server = MockServer::start().await;
    mount(&server, "/health/live", status_body("UP")).await;
    mount(&server, "/health/ready", status_body("DOWN")).await;

    let handle = HealthMonitor::new(client_for(&server), Duration::from_secs(30)).activate();
    let mut rx = handle.subscribe();

    tokio::time::timeout(Duration::from_secs(5), rx.changed())
        .await
        .expect("first cycle settles")
        .expect("monitor still running");

    let snapshot = handle.current().expect("snapshot published");
    assert_eq!(snapshot.cycle, 1);
    assert_eq!(snapshot.status, HealthStatus::probed(true, false));

    let text = HealthView::from_state(Some(&snapshot)).to_string();
    assert!(text.contains("System is live"));
    assert!(text.contains("System is not ready"));

    handle.shutdown().await;

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 2);
}
