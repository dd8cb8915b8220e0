//! Health monitor: polls both probes on a timer and publishes the result.

pub mod poller;
pub mod status;

pub use poller::{poll_once, HealthMonitor, MonitorHandle, DEFAULT_POLL_INTERVAL};
pub use status::{HealthStatus, Snapshot};
