//! Typed events carried by the live stream.

use super::error::FrameError;
use crate::store::ServerStatus;
use serde::{Deserialize, Serialize};

/// Text the backend sends back for every `ping` keepalive.
pub const KEEPALIVE_REPLY: &str = "pong";

/// One decoded stream frame, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Metrics(MetricsEvent),
    AlertFired(AlertFiredEvent),
    AlertResolved(AlertResolvedEvent),
    StatusChange(StatusChangeEvent),
    /// Any `type` this client doesn't know about
    #[serde(other)]
    Unknown,
}

impl StreamEvent {
    /// Wire name of the event type.
    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::Metrics(_) => "metrics",
            StreamEvent::AlertFired(_) => "alert_fired",
            StreamEvent::AlertResolved(_) => "alert_resolved",
            StreamEvent::StatusChange(_) => "status_change",
            StreamEvent::Unknown => "unknown",
        }
    }
}

/// Latest metrics for one server. The per-server scope omits `status` and
/// `server_name` and sends a richer `data` object; extra keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsEvent {
    pub server_id: u64,
    #[serde(default)]
    pub server_name: Option<String>,
    #[serde(default)]
    pub status: Option<ServerStatus>,
    #[serde(default)]
    pub data: MetricsData,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsData {
    pub cpu_usage_pct: Option<f64>,
    pub mem_usage_pct: Option<f64>,
    pub disk_max_pct: Option<f64>,
    pub net_connections: Option<f64>,
    pub process_count: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertFiredEvent {
    pub alert_id: u64,
    pub server_id: u64,
    #[serde(default)]
    pub server_name: String,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub metric_name: Option<String>,
    #[serde(default)]
    pub metric_value: Option<f64>,
    #[serde(default)]
    pub threshold_value: Option<f64>,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertResolvedEvent {
    pub alert_id: u64,
    #[serde(default)]
    pub server_id: Option<u64>,
    #[serde(default)]
    pub server_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChangeEvent {
    pub server_id: u64,
    #[serde(default)]
    pub server_name: Option<String>,
    #[serde(default)]
    pub old_status: Option<ServerStatus>,
    pub new_status: ServerStatus,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Decode one text frame.
pub fn decode_frame(text: &str) -> Result<StreamEvent, FrameError> {
    if text.trim() == KEEPALIVE_REPLY {
        return Err(FrameError::Keepalive);
    }
    serde_json::from_str(text).map_err(|e| FrameError::Malformed(e.to_string()))
}

/// Decode one text frame, logging and dropping anything unusable.
pub fn parse_frame(text: &str) -> Option<StreamEvent> {
    match decode_frame(text) {
        Ok(event) => Some(event),
        Err(FrameError::Keepalive) => {
            tracing::trace!("Keepalive reply received");
            None
        }
        Err(error) => {
            tracing::warn!(
                error = %error,
                frame_len = text.len(),
                "Dropping unparseable stream frame"
            );
            None
        }
    }
}
