//! Application configuration loaded from environment variables.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::{MonitorError, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Monitored Backend ===
    /// Base URL the `/health/live` and `/health/ready` paths are appended to.
    #[serde(default = "default_base_url")]
    pub health_api_base_url: String,

    /// Seconds between poll cycles.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Optional per-request timeout. Unset means the transport default.
    #[serde(default)]
    pub http_timeout_ms: Option<u64>,

    // === Server Configuration ===
    /// HTTP server port for the status page and metrics.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Expose Prometheus metrics on `/metrics`.
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_base_url() -> String {
    "http://localhost:8081".to_string()
}

fn default_poll_interval() -> u64 {
    30
}

fn default_port() -> u16 {
    3000
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            health_api_base_url: default_base_url(),
            poll_interval_secs: default_poll_interval(),
            http_timeout_ms: None,
            port: default_port(),
            metrics_enabled: default_true(),
            rust_log: default_log_level(),
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Build configuration from `(NAME, value)` pairs; names are matched
    /// case-insensitively.
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::from_iter(vars)?)
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.health_api_base_url).map_err(|e| {
            MonitorError::InvalidConfig(format!("HEALTH_API_BASE_URL is not a valid URL: {}", e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(MonitorError::InvalidConfig(format!(
                "HEALTH_API_BASE_URL must use http or https, got {}",
                url.scheme()
            )));
        }

        if self.poll_interval_secs == 0 {
            return Err(MonitorError::InvalidConfig(
                "POLL_INTERVAL_SECS must be at least 1".to_string(),
            ));
        }

        if self.http_timeout_ms == Some(0) {
            return Err(MonitorError::InvalidConfig(
                "HTTP_TIMEOUT_MS must be positive when set".to_string(),
            ));
        }

        Ok(())
    }

    /// Poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Request timeout, if one was configured.
    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_ms.map(Duration::from_millis)
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.health_api_base_url.trim_end_matches('/')
    }
}
