//! Rendering of monitor state.
//!
//! [`HealthView::from_state`] is a pure function of the published state;
//! the text ([`std::fmt::Display`]) and HTML ([`html::StatusPage`])
//! renderers are pure functions of the view.

pub mod html;

use std::fmt;

use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::monitor::Snapshot;
use crate::probe::{ProbeKind, ProbeResponse};

/// Page heading.
pub const TITLE: &str = "System Health";

/// Shown while the first poll is in flight.
pub const LOADING_TEXT: &str = "Loading...";

/// Positive or negative indicator on a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// Probe reported "UP".
    Positive,
    /// Probe reported anything else.
    Negative,
}

impl Indicator {
    fn from_flag(ok: bool) -> Self {
        if ok {
            Indicator::Positive
        } else {
            Indicator::Negative
        }
    }

    /// Short tag used by the text renderer.
    pub fn tag(&self) -> &'static str {
        match self {
            Indicator::Positive => "[OK]",
            Indicator::Negative => "[FAIL]",
        }
    }
}

/// One dependency line under a panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckLine {
    /// Dependency name.
    pub name: String,
    /// Reported status.
    pub status: String,
    /// Failure detail.
    pub message: Option<String>,
}

/// One status panel (liveness or readiness).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    /// Which probe this panel shows.
    pub kind: ProbeKind,
    /// Positive or negative.
    pub indicator: Indicator,
    /// Human-readable status line.
    pub message: &'static str,
    /// Backend-reported uptime.
    pub uptime: Option<String>,
    /// Backend-reported dependency checks.
    pub checks: Vec<CheckLine>,
}

impl Panel {
    fn new(kind: ProbeKind, ok: bool, body: Option<&ProbeResponse>) -> Self {
        Self {
            kind,
            indicator: Indicator::from_flag(ok),
            message: panel_message(kind, ok),
            uptime: body.and_then(|b| b.uptime.clone()),
            checks: body
                .map(|b| {
                    b.checks
                        .iter()
                        .map(|(name, check)| CheckLine {
                            name: name.clone(),
                            status: check.status.clone(),
                            message: check.message.clone(),
                        })
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

/// Status line for a probe given its flag.
pub fn panel_message(kind: ProbeKind, ok: bool) -> &'static str {
    match (kind, ok) {
        (ProbeKind::Liveness, true) => "System is live",
        (ProbeKind::Liveness, false) => "System is not responding",
        (ProbeKind::Readiness, true) => "System is ready to handle requests",
        (ProbeKind::Readiness, false) => "System is not ready",
    }
}

/// What the status page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthView {
    /// First poll has not settled.
    Loading,
    /// Last poll failed.
    Error {
        /// Notice text.
        message: String,
        /// Cycle that failed.
        cycle: u64,
    },
    /// Last poll settled with both answers.
    Panels {
        /// Liveness panel.
        liveness: Panel,
        /// Readiness panel.
        readiness: Panel,
        /// Cycle shown.
        cycle: u64,
        /// When the cycle settled.
        checked_at: OffsetDateTime,
    },
}

impl HealthView {
    /// Derive the view from the monitor's published state.
    pub fn from_state(state: Option<&Snapshot>) -> Self {
        let Some(snapshot) = state else {
            return HealthView::Loading;
        };

        if let Some(message) = snapshot.status.error() {
            return HealthView::Error {
                message: message.to_string(),
                cycle: snapshot.cycle,
            };
        }

        HealthView::Panels {
            liveness: Panel::new(
                ProbeKind::Liveness,
                snapshot.status.live(),
                snapshot.liveness.as_ref(),
            ),
            readiness: Panel::new(
                ProbeKind::Readiness,
                snapshot.status.ready(),
                snapshot.readiness.as_ref(),
            ),
            cycle: snapshot.cycle,
            checked_at: snapshot.checked_at,
        }
    }

    /// Whether this is the loading state.
    pub fn is_loading(&self) -> bool {
        matches!(self, HealthView::Loading)
    }

    /// Panels, when the view has them.
    pub fn panels(&self) -> Option<[&Panel; 2]> {
        match self {
            HealthView::Panels {
                liveness,
                readiness,
                ..
            } => Some([liveness, readiness]),
            _ => None,
        }
    }
}

/// RFC 3339 timestamp, or empty if formatting fails.
pub fn format_timestamp(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_default()
}

impl fmt::Display for HealthView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthView::Loading => write!(f, "{}", LOADING_TEXT),
            HealthView::Error { message, cycle } => {
                writeln!(f, "{}", TITLE)?;
                writeln!(f)?;
                writeln!(f, "[ERROR] {}", message)?;
                writeln!(f)?;
                write!(f, "cycle {}", cycle)
            }
            HealthView::Panels {
                liveness,
                readiness,
                cycle,
                checked_at,
            } => {
                writeln!(f, "{}", TITLE)?;
                for panel in [liveness, readiness] {
                    writeln!(f)?;
                    writeln!(f, "{}", panel.kind.title())?;
                    writeln!(f, "  {} {}", panel.indicator.tag(), panel.message)?;
                    if let Some(uptime) = &panel.uptime {
                        writeln!(f, "  uptime: {}", uptime)?;
                    }
                    for check in &panel.checks {
                        match &check.message {
                            Some(message) => {
                                writeln!(f, "  {}: {} ({})", check.name, check.status, message)?
                            }
                            None => writeln!(f, "  {}: {}", check.name, check.status)?,
                        }
                    }
                }
                writeln!(f)?;
                write!(f, "cycle {}, checked {}", cycle, format_timestamp(*checked_at))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeError;
    use crate::probe::CheckStatus;
    use pretty_assertions::assert_eq;

    fn snapshot(live: &str, ready: &str) -> Snapshot {
        Snapshot::from_outcomes(
            1,
            Ok(ProbeResponse::with_status(live)),
            Ok(ProbeResponse::with_status(ready)),
        )
    }

    #[test]
    fn loading_shows_only_the_indicator() {
        let view = HealthView::from_state(None);

        assert!(view.is_loading());
        assert!(view.panels().is_none());
        assert_eq!(view.to_string(), "Loading...");
    }

    #[test]
    fn error_shows_a_single_notice() {
        let failed = Snapshot::from_outcomes(
            4,
            Err(ProbeError::HttpStatus {
                kind: ProbeKind::Liveness,
                status: 500,
            }),
            Ok(ProbeResponse::with_status("UP")),
        );
        let view = HealthView::from_state(Some(&failed));

        assert!(view.panels().is_none());
        let text = view.to_string();
        assert!(text.contains("[ERROR] Failed to fetch health status"));
        assert!(!text.contains("Liveness Check"));
        assert!(!text.contains("Readiness Check"));
    }

    #[test]
    fn panels_reflect_each_flag_independently() {
        let snapshot = snapshot("DOWN", "UP");
        let view = HealthView::from_state(Some(&snapshot));
        let [liveness, readiness] = view.panels().unwrap();

        assert_eq!(liveness.indicator, Indicator::Negative);
        assert_eq!(liveness.message, "System is not responding");
        assert_eq!(readiness.indicator, Indicator::Positive);
        assert_eq!(readiness.message, "System is ready to handle requests");
    }

    #[test]
    fn text_view_lists_uptime_and_checks() {
        let mut readiness = ProbeResponse::with_status("DOWN");
        readiness.checks.insert(
            "database".to_string(),
            CheckStatus {
                status: "DOWN".to_string(),
                message: Some("connection refused".to_string()),
            },
        );
        let mut liveness = ProbeResponse::with_status("UP");
        liveness.uptime = Some("2h0m0s".to_string());

        let snapshot = Snapshot::from_outcomes(2, Ok(liveness), Ok(readiness));
        let text = HealthView::from_state(Some(&snapshot)).to_string();

        assert!(text.starts_with("System Health"));
        assert!(text.contains("  [OK] System is live"));
        assert!(text.contains("  uptime: 2h0m0s"));
        assert!(text.contains("  [FAIL] System is not ready"));
        assert!(text.contains("  database: DOWN (connection refused)"));
        assert!(text.contains("cycle 2, checked "));
    }

    #[test]
    fn panel_messages() {
        assert_eq!(panel_message(ProbeKind::Liveness, true), "System is live");
        assert_eq!(panel_message(ProbeKind::Readiness, false), "System is not ready");
    }
}
