use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Tuning for the probe transport and the page measurer.
/// Read from the optional YAML config file; every field falls back to its default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Per-request timeout of the reachability client, in seconds.
    pub request_timeout_seconds: u64,

    /// Upper bound for a single page measurement, in seconds.
    pub measurement_timeout_seconds: u64,

    /// Idle keep-alive connections retained per host.
    pub max_idle_connections: usize,

    /// How long an idle keep-alive connection is kept open, in seconds.
    pub idle_timeout_seconds: u64,

    pub user_agent: String,

    /// Accept self-signed or expired certificates on monitored sites.
    pub accept_invalid_certs: bool,
}

impl ProbeConfig {
    /// Rejects zero timeouts, which would fail every request before it starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::ZeroValue("request_timeout_seconds"));
        }
        if self.measurement_timeout_seconds == 0 {
            return Err(ConfigError::ZeroValue("measurement_timeout_seconds"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn measurement_timeout(&self) -> Duration {
        Duration::from_secs(self.measurement_timeout_seconds)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_seconds)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: 30,
            measurement_timeout_seconds: 30,
            max_idle_connections: 10,
            idle_timeout_seconds: 30,
            user_agent: default_user_agent(),
            accept_invalid_certs: false,
        }
    }
}

fn default_user_agent() -> String {
    format!("webalert-probe/{}", env!("CARGO_PKG_VERSION"))
}
