//! Wire types for the backend's health endpoints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Status literal the backend reports for a healthy probe.
pub const STATUS_UP: &str = "UP";

/// Which of the two backend health endpoints a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProbeKind {
    /// Whether the process is running at all.
    Liveness,
    /// Whether the process can serve requests.
    Readiness,
}

impl ProbeKind {
    /// Both probes, in poll order.
    pub const ALL: [ProbeKind; 2] = [ProbeKind::Liveness, ProbeKind::Readiness];

    /// Path appended to the configured base URL.
    pub fn path(&self) -> &'static str {
        match self {
            ProbeKind::Liveness => "/health/live",
            ProbeKind::Readiness => "/health/ready",
        }
    }

    /// Panel title used by the views.
    pub fn title(&self) -> &'static str {
        match self {
            ProbeKind::Liveness => "Liveness Check",
            ProbeKind::Readiness => "Readiness Check",
        }
    }
}

/// Body returned by `/health/live` and `/health/ready`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProbeResponse {
    /// "UP" or "DOWN". Required: a body without it is malformed.
    pub status: String,
    /// Process uptime as reported by the backend (liveness only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<String>,
    /// Per-dependency results (readiness only).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub checks: BTreeMap<String, CheckStatus>,
}

impl ProbeResponse {
    /// Response carrying only a status.
    pub fn with_status(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            uptime: None,
            checks: BTreeMap::new(),
        }
    }

    /// Exact, case-sensitive match against "UP".
    pub fn is_up(&self) -> bool {
        self.status == STATUS_UP
    }

    /// Dependency checks that did not report "UP".
    pub fn failing_checks(&self) -> impl Iterator<Item = (&String, &CheckStatus)> {
        self.checks.iter().filter(|(_, check)| !check.is_up())
    }
}

/// Result of one backend dependency check.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CheckStatus {
    /// "UP" or "DOWN".
    pub status: String,
    /// Failure detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckStatus {
    /// Exact match against "UP".
    pub fn is_up(&self) -> bool {
        self.status == STATUS_UP
    }
}
