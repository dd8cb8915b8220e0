//! Probe module for the backend's health endpoints.
//!
//! This module handles:
//! - Wire types for `/health/live` and `/health/ready`
//! - The `HealthProbe` seam and its reqwest implementation
//! - Mock probe for testing

pub mod client;
pub mod mock;
pub mod types;

pub use client::{HealthClient, HealthProbe};
pub use mock::{MockConfig, MockHealthClient, MockReply};
pub use types::{CheckStatus, ProbeKind, ProbeResponse, STATUS_UP};
