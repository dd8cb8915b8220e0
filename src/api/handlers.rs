//! HTTP API handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use tokio::sync::watch;
use tracing::error;

use crate::monitor::{HealthStatus, Snapshot};
use crate::probe::STATUS_UP;
use crate::view::html::StatusPage;
use crate::view::{format_timestamp, HealthView};

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Latest monitor state; `None` until the first poll settles.
    pub snapshot: watch::Receiver<Option<Snapshot>>,
    /// HTML renderer for `/status`.
    pub page: Arc<StatusPage>,
    /// Prometheus handle when metrics are enabled.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state.
    pub fn new(snapshot: watch::Receiver<Option<Snapshot>>, page: StatusPage) -> Self {
        Self {
            snapshot,
            page: Arc::new(page),
            metrics: None,
        }
    }

    /// Attach a Prometheus handle.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Check if the first poll has settled.
    pub fn is_ready(&self) -> bool {
        self.snapshot.borrow().is_some()
    }

    /// Copy of the current snapshot.
    pub fn current(&self) -> Option<Snapshot> {
        self.snapshot.borrow().clone()
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "UP".
    pub status: &'static str,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    /// Whether the first poll has settled.
    pub ready: bool,
}

/// Monitor status response.
#[derive(Debug, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum StatusResponse {
    /// First poll has not settled.
    Loading,
    /// Last settled poll.
    Settled {
        /// Aggregated record.
        #[serde(flatten)]
        status: HealthStatus,
        /// Cycle number.
        cycle: u64,
        /// RFC 3339 settle time.
        checked_at: String,
        /// Backend-reported uptime.
        #[serde(skip_serializing_if = "Option::is_none")]
        uptime: Option<String>,
    },
}

impl From<Option<Snapshot>> for StatusResponse {
    fn from(snapshot: Option<Snapshot>) -> Self {
        match snapshot {
            None => StatusResponse::Loading,
            Some(snapshot) => StatusResponse::Settled {
                uptime: snapshot.liveness.and_then(|body| body.uptime),
                status: snapshot.status,
                cycle: snapshot.cycle,
                checked_at: format_timestamp(snapshot.checked_at),
            },
        }
    }
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: STATUS_UP })
}

/// Readiness check handler - returns 200 once the first poll settled, 503 otherwise.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let is_ready = state.is_ready();
    let response = ReadyResponse { ready: is_ready };

    if is_ready {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

/// Status handler - returns the latest poll result as JSON.
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    Json(StatusResponse::from(state.current()))
}

/// Status page handler - renders the latest poll result as HTML, 500 if rendering fails.
pub async fn status_page(State(state): State<AppState>) -> Response {
    let snapshot = state.current();
    match state.page.render(&HealthView::from_state(snapshot.as_ref())) {
        Ok(page) => Html(page).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render status page");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Metrics handler - Prometheus text format, 404 when disabled.
pub async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::DEFAULT_POLL_INTERVAL;
    use crate::probe::ProbeResponse;
    use pretty_assertions::assert_eq;

    #[test]
    fn app_state_ready_follows_snapshot() {
        let (tx, rx) = watch::channel(None);
        let state = AppState::new(rx, StatusPage::new(DEFAULT_POLL_INTERVAL).unwrap());
        assert!(!state.is_ready());

        tx.send_replace(Some(Snapshot::from_outcomes(
            1,
            Ok(ProbeResponse::with_status("UP")),
            Ok(ProbeResponse::with_status("UP")),
        )));
        assert!(state.is_ready());
    }

    #[test]
    fn status_response_shapes() {
        let loading = serde_json::to_value(StatusResponse::from(None)).unwrap();
        assert_eq!(loading, serde_json::json!({"state": "loading"}));

        let mut liveness = ProbeResponse::with_status("UP");
        liveness.uptime = Some("10s".to_string());
        let snapshot =
            Snapshot::from_outcomes(7, Ok(liveness), Ok(ProbeResponse::with_status("DOWN")));
        let settled = serde_json::to_value(StatusResponse::from(Some(snapshot))).unwrap();

        assert_eq!(settled["state"], "settled");
        assert_eq!(settled["live"], true);
        assert_eq!(settled["ready"], false);
        assert_eq!(settled["cycle"], 7);
        assert_eq!(settled["uptime"], "10s");
        assert!(settled.get("error").is_none());
    }
}
