//! Mock health probe for unit testing.
//!
//! Clones share state, so a test can keep one clone to reconfigure answers
//! while the monitor owns another.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ProbeError;

use super::client::HealthProbe;
use super::types::{ProbeKind, ProbeResponse};

/// What a mock endpoint answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    /// 200 with the given body.
    Body(ProbeResponse),
    /// Non-2xx status.
    HttpStatus(u16),
    /// 200 with a body that does not match the expected shape.
    Malformed,
}

impl MockReply {
    /// 200 `{"status":"UP"}`.
    pub fn up() -> Self {
        MockReply::Body(ProbeResponse::with_status("UP"))
    }

    /// 200 `{"status":"DOWN"}`.
    pub fn down() -> Self {
        MockReply::Body(ProbeResponse::with_status("DOWN"))
    }
}

/// Configuration for mock client behavior.
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Answer for `/health/live`.
    pub liveness: MockReply,
    /// Answer for `/health/ready`.
    pub readiness: MockReply,
    /// Simulated latency applied to every call.
    pub latency: Duration,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            liveness: MockReply::up(),
            readiness: MockReply::up(),
            latency: Duration::ZERO,
        }
    }
}

/// Mock health probe for testing.
#[derive(Debug, Clone, Default)]
pub struct MockHealthClient {
    config: Arc<Mutex<MockConfig>>,
    calls: Arc<AtomicU64>,
}

impl MockHealthClient {
    /// Create a mock where both probes answer "UP" immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock client with custom configuration.
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config: Arc::new(Mutex::new(config)),
            calls: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Set the liveness answer.
    pub fn set_liveness(&self, reply: MockReply) {
        self.lock().liveness = reply;
    }

    /// Set the readiness answer.
    pub fn set_readiness(&self, reply: MockReply) {
        self.lock().readiness = reply;
    }

    /// Number of probe calls started so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockConfig> {
        self.config.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl HealthProbe for MockHealthClient {
    async fn check(&self, kind: ProbeKind) -> Result<ProbeResponse, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let latency = self.lock().latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        // Read the reply after the delay so reconfiguration mid-flight is observed.
        let reply = match kind {
            ProbeKind::Liveness => self.lock().liveness.clone(),
            ProbeKind::Readiness => self.lock().readiness.clone(),
        };

        match reply {
            MockReply::Body(body) => Ok(body),
            MockReply::HttpStatus(status) => Err(ProbeError::HttpStatus { kind, status }),
            MockReply::Malformed => Err(ProbeError::Payload {
                kind,
                reason: "missing field `status`".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn mock_client_defaults_to_up() {
        let client = MockHealthClient::new();

        let live = assert_ok!(client.check_liveness().await);
        let ready = assert_ok!(client.check_readiness().await);
        assert!(live.is_up());
        assert!(ready.is_up());
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn mock_client_failure_modes() {
        let client = MockHealthClient::new();
        client.set_liveness(MockReply::HttpStatus(500));
        client.set_readiness(MockReply::Malformed);

        let live = assert_err!(client.check_liveness().await);
        assert!(matches!(live, ProbeError::HttpStatus { status: 500, .. }));

        let ready = assert_err!(client.check_readiness().await);
        assert_eq!(ready.kind(), ProbeKind::Readiness);
    }

    #[tokio::test]
    async fn clones_share_configuration() {
        let client = MockHealthClient::new();
        let observer = client.clone();
        observer.set_readiness(MockReply::down());

        let ready = assert_ok!(client.check_readiness().await);
        assert!(!ready.is_up());
        assert_eq!(observer.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn latency_is_simulated() {
        let client = MockHealthClient::with_config(MockConfig {
            latency: Duration::from_secs(5),
            ..Default::default()
        });

        let start = tokio::time::Instant::now();
        assert_ok!(client.check_liveness().await);
        assert!(start.elapsed() >= Duration::from_secs(5));
    }
}
