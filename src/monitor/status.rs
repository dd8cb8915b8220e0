//! The status record produced by each poll cycle.

use serde::Serialize;
use time::OffsetDateTime;

use crate::error::{ProbeError, FETCH_FAILED_MESSAGE};
use crate::probe::ProbeResponse;

/// Aggregated liveness/readiness flags for one poll cycle.
///
/// Only constructible through [`HealthStatus::probed`] and
/// [`HealthStatus::failed`], so `error` set implies both flags are false.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    live: bool,
    ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl HealthStatus {
    /// Both queries answered.
    pub fn probed(live: bool, ready: bool) -> Self {
        Self {
            live,
            ready,
            error: None,
        }
    }

    /// At least one query failed.
    pub fn failed() -> Self {
        Self {
            live: false,
            ready: false,
            error: Some(FETCH_FAILED_MESSAGE.to_string()),
        }
    }

    /// Fold the two query outcomes into a record.
    pub fn from_outcomes(
        liveness: &Result<ProbeResponse, ProbeError>,
        readiness: &Result<ProbeResponse, ProbeError>,
    ) -> Self {
        match (liveness, readiness) {
            (Ok(live), Ok(ready)) => Self::probed(live.is_up(), ready.is_up()),
            _ => Self::failed(),
        }
    }

    /// Liveness endpoint reported "UP".
    pub fn live(&self) -> bool {
        self.live
    }

    /// Readiness endpoint reported "UP".
    pub fn ready(&self) -> bool {
        self.ready
    }

    /// Failure message, if the cycle failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Live, ready, and no error.
    pub fn is_healthy(&self) -> bool {
        self.live && self.ready && self.error.is_none()
    }
}

/// Everything published for one settled poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// The aggregated record.
    pub status: HealthStatus,
    /// Liveness body; `None` when the cycle failed.
    pub liveness: Option<ProbeResponse>,
    /// Readiness body; `None` when the cycle failed.
    pub readiness: Option<ProbeResponse>,
    /// 1-based cycle counter.
    pub cycle: u64,
    /// When the cycle settled.
    pub checked_at: OffsetDateTime,
}

impl Snapshot {
    /// Build a snapshot from the two query outcomes. Bodies are dropped
    /// unless both queries succeeded.
    pub fn from_outcomes(
        cycle: u64,
        liveness: Result<ProbeResponse, ProbeError>,
        readiness: Result<ProbeResponse, ProbeError>,
    ) -> Self {
        let status = HealthStatus::from_outcomes(&liveness, &readiness);
        let (liveness, readiness) = match (liveness, readiness) {
            (Ok(live), Ok(ready)) => (Some(live), Some(ready)),
            _ => (None, None),
        };

        Self {
            status,
            liveness,
            readiness,
            cycle,
            checked_at: OffsetDateTime::now_utc(),
        }
    }
}
