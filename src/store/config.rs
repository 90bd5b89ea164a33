//! Configuration for the live dashboard store.

use super::alerts::DEFAULT_ALERT_CAPACITY;
use serde::{Deserialize, Serialize};

/// Store behaviour knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum number of alerts kept, newest first
    pub alert_capacity: usize,
    /// Collapse redelivered `alert_fired` events with the same id
    pub dedup_alerts: bool,
    /// Seconds between background snapshot reloads (0 disables)
    pub snapshot_refresh_seconds: u64,
    /// Capacity of the change-notification broadcast channel
    pub change_buffer: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            alert_capacity: DEFAULT_ALERT_CAPACITY,
            dedup_alerts: true,
            snapshot_refresh_seconds: 0,
            change_buffer: 256,
        }
    }
}
