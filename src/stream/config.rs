//! Configuration for the live event stream.

use serde::{Deserialize, Serialize};

/// Live stream settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Whether to open the stream at all
    pub enabled: bool,
    /// Fixed delay between a disconnect and the next connection attempt
    pub reconnect_delay_ms: u64,
    /// Seconds between `ping` keepalive frames (0 disables)
    pub keepalive_seconds: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reconnect_delay_ms: 3000,
            keepalive_seconds: 30,
        }
    }
}
