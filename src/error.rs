//! Unified error types for the health monitor.

use thiserror::Error;

use crate::probe::ProbeKind;

/// User-facing message shown whenever a poll cycle fails.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch health status";

/// Unified error type for the health monitor.
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// HTTP client construction error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Status page template failed to load or render.
    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single health query that did not produce a usable payload.
///
/// All variants collapse into [`FETCH_FAILED_MESSAGE`] once they reach the
/// monitor; the variant only matters for logs.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Request never produced a response (connect, DNS, reset, timeout).
    #[error("{kind} request failed: {source}")]
    Transport {
        /// Which probe failed.
        kind: ProbeKind,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// Endpoint answered with a non-2xx status.
    #[error("{kind} endpoint returned HTTP {status}")]
    HttpStatus {
        /// Which probe failed.
        kind: ProbeKind,
        /// Response status code.
        status: u16,
    },

    /// Response body did not match the expected shape.
    #[error("{kind} payload malformed: {reason}")]
    Payload {
        /// Which probe failed.
        kind: ProbeKind,
        /// Parse failure detail.
        reason: String,
    },
}

impl ProbeError {
    /// The probe this error belongs to.
    pub fn kind(&self) -> ProbeKind {
        match self {
            ProbeError::Transport { kind, .. }
            | ProbeError::HttpStatus { kind, .. }
            | ProbeError::Payload { kind, .. } => *kind,
        }
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, MonitorError>;
