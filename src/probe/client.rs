//! reqwest-backed health probe client.

use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::ProbeError;
use crate::metrics;

use super::types::{ProbeKind, ProbeResponse};

/// Source of liveness/readiness answers.
///
/// Implemented by [`HealthClient`] for real endpoints and by
/// [`MockHealthClient`](super::MockHealthClient) in tests.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Query one endpoint.
    async fn check(&self, kind: ProbeKind) -> Result<ProbeResponse, ProbeError>;

    /// Query `/health/live`.
    async fn check_liveness(&self) -> Result<ProbeResponse, ProbeError> {
        self.check(ProbeKind::Liveness).await
    }

    /// Query `/health/ready`.
    async fn check_readiness(&self) -> Result<ProbeResponse, ProbeError> {
        self.check(ProbeKind::Readiness).await
    }
}

/// HTTP client for the backend's health endpoints.
#[derive(Debug, Clone)]
pub struct HealthClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Base URL, no trailing slash.
    base_url: String,
}

impl HealthClient {
    /// Create a client from config. No retries; the timeout is the
    /// transport default unless `HTTP_TIMEOUT_MS` is set.
    pub fn new(config: &Config) -> crate::Result<Self> {
        let mut builder = reqwest::Client::builder()
            .default_headers(json_headers())
            .tcp_keepalive(std::time::Duration::from_secs(30));

        if let Some(timeout) = config.http_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url().to_string(),
        })
    }

    /// Full URL for a probe.
    pub fn url(&self, kind: ProbeKind) -> String {
        format!("{}{}", self.base_url, kind.path())
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn json_headers() -> reqwest::header::HeaderMap {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::CONTENT_TYPE,
        reqwest::header::HeaderValue::from_static("application/json"),
    );
    headers
}

#[async_trait]
impl HealthProbe for HealthClient {
    #[instrument(skip(self), fields(probe = %kind))]
    async fn check(&self, kind: ProbeKind) -> Result<ProbeResponse, ProbeError> {
        let url = self.url(kind);
        let start = Instant::now();

        let result: Result<ProbeResponse, ProbeError> = async {
            let response = self
                .http
                .get(&url)
                .send()
                .await
                .map_err(|source| ProbeError::Transport { kind, source })?;

            if !response.status().is_success() {
                return Err(ProbeError::HttpStatus {
                    kind,
                    status: response.status().as_u16(),
                });
            }

            response
                .json::<ProbeResponse>()
                .await
                .map_err(|e| ProbeError::Payload {
                    kind,
                    reason: e.to_string(),
                })
        }
        .await;

        metrics::record_probe_latency(start, kind);

        if let Ok(body) = &result {
            debug!(status = %body.status, "Probe answered");
        }

        result
    }
}
