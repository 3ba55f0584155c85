//! Configuration for a sync session

use cw_config::NetworkConfig;
use std::time::Duration;

/// Configuration for the session manager
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Shared game code; the host binds it, clients connect to it
    pub code: String,

    /// How often each connection checks its stale flag (default: 250 ms)
    pub flush_interval: Duration,

    /// Delay before a client retries a lost join (default: 500 ms)
    pub join_backoff: Duration,

    /// Hold-to-reveal sampling period (default: 25 ms)
    pub reveal_sample: Duration,

    /// Notifications buffered per subscriber before old ones are dropped
    pub notification_capacity: usize,
}

impl SessionConfig {
    /// Session timings taken from the `[network]` section
    pub fn from_network(code: impl Into<String>, network: &NetworkConfig) -> Self {
        Self {
            code: code.into(),
            flush_interval: Duration::from_millis(network.flush_interval_ms),
            join_backoff: Duration::from_millis(network.join_backoff_ms),
            reveal_sample: Duration::from_millis(network.reveal_sample_ms),
            notification_capacity: 64,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.code.trim().is_empty() {
            anyhow::bail!("game code cannot be empty");
        }
        if self.code.chars().any(char::is_whitespace) {
            anyhow::bail!("game code cannot contain whitespace");
        }
        if self.flush_interval.is_zero() || self.reveal_sample.is_zero() {
            anyhow::bail!("flush and reveal intervals must be greater than zero");
        }
        if self.notification_capacity == 0 {
            anyhow::bail!("notification_capacity must be greater than zero");
        }
        Ok(())
    }
}
