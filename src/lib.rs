//! Health monitor for a backend exposing liveness and readiness endpoints.
//!
//! Every poll cycle queries both endpoints concurrently, waits for both, and
//! replaces the published status record:
//!
//! ```text
//! GET /health/live  -> {"status":"UP"}    live  = true
//! GET /health/ready -> {"status":"DOWN"}  ready = false
//! ─────────────────────────────────────────────────────
//! any query fails   -> live = ready = false,
//!                      error = "Failed to fetch health status"
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`probe`]: Health endpoint client and mock
//! - [`monitor`]: Status record and the polling loop
//! - [`view`]: Text and HTML rendering of monitor state
//! - [`api`]: HTTP API for the status page, health, and metrics
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod monitor;
pub mod probe;
pub mod utils;
pub mod view;

pub use config::Config;
pub use error::{MonitorError, ProbeError, Result};
pub use monitor::{HealthMonitor, HealthStatus, MonitorHandle, Snapshot};
