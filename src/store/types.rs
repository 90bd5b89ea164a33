//! Wire and state types for the dashboard store.
//!
//! Field names match the ServerEye REST payloads exactly so the same types
//! deserialize snapshot responses and back the in-memory state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Health status of a monitored server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Online,
    Warning,
    Critical,
    Offline,
    Maintenance,
    /// Anything the backend reports that we don't recognise lands here.
    #[default]
    #[serde(other)]
    Unknown,
}

impl ServerStatus {
    pub const ALL: [ServerStatus; 6] = [
        ServerStatus::Online,
        ServerStatus::Warning,
        ServerStatus::Critical,
        ServerStatus::Offline,
        ServerStatus::Maintenance,
        ServerStatus::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServerStatus::Online => "online",
            ServerStatus::Warning => "warning",
            ServerStatus::Critical => "critical",
            ServerStatus::Offline => "offline",
            ServerStatus::Maintenance => "maintenance",
            ServerStatus::Unknown => "unknown",
        }
    }

    /// Rank used when sorting by status, most severe first.
    pub fn severity_rank(&self) -> u8 {
        match self {
            ServerStatus::Critical => 0,
            ServerStatus::Warning => 1,
            ServerStatus::Offline => 2,
            ServerStatus::Unknown => 3,
            ServerStatus::Maintenance => 4,
            ServerStatus::Online => 5,
        }
    }
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "online" => Ok(ServerStatus::Online),
            "warning" => Ok(ServerStatus::Warning),
            "critical" => Ok(ServerStatus::Critical),
            "offline" => Ok(ServerStatus::Offline),
            "maintenance" => Ok(ServerStatus::Maintenance),
            "unknown" => Ok(ServerStatus::Unknown),
            _ => Err(format!("Invalid server status: {}", s)),
        }
    }
}

/// Alert severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Warning,
    Critical,
}

impl Severity {
    /// Lenient parse used for stream payloads: missing or unrecognised
    /// values fall back to `Warning`.
    pub fn parse_or_warning(value: Option<&str>) -> Self {
        match value.map(|v| v.to_lowercase()) {
            Some(v) if v == "critical" => Severity::Critical,
            _ => Severity::Warning,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the server inventory with its latest metric snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSummary {
    pub server_id: u64,
    pub display_name: String,
    pub ip_address: String,
    pub os_type: String,
    #[serde(default)]
    pub group_name: String,
    #[serde(default)]
    pub status: ServerStatus,
    #[serde(default)]
    pub cpu_usage_pct: Option<f64>,
    #[serde(default)]
    pub mem_usage_pct: Option<f64>,
    #[serde(default)]
    pub disk_max_pct: Option<f64>,
    #[serde(default)]
    pub last_collected_at: Option<String>,
    #[serde(default)]
    pub active_alerts: u32,
}

/// An unresolved alert as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveAlert {
    pub alert_id: u64,
    pub server_id: u64,
    pub server_name: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_value: Option<f64>,
    pub message: String,
    #[serde(default)]
    pub acknowledged: bool,
    pub created_at: String,
    #[serde(default)]
    pub duration_seconds: u64,
}

/// Per-status server counts inside the summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusCounts {
    pub online: u32,
    pub warning: u32,
    pub critical: u32,
    pub offline: u32,
    pub maintenance: u32,
    pub unknown: u32,
}

impl StatusCounts {
    pub fn get(&self, status: ServerStatus) -> u32 {
        match status {
            ServerStatus::Online => self.online,
            ServerStatus::Warning => self.warning,
            ServerStatus::Critical => self.critical,
            ServerStatus::Offline => self.offline,
            ServerStatus::Maintenance => self.maintenance,
            ServerStatus::Unknown => self.unknown,
        }
    }
}

/// Aggregate infrastructure snapshot. Always replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSummary {
    pub total_servers: u32,
    pub status_counts: StatusCounts,
    pub avg_cpu: f64,
    pub avg_mem: f64,
    pub active_alerts: u32,
    pub unacknowledged_alerts: u32,
    pub today_alert_count: u32,
    pub uptime_pct: f64,
}

/// Partial update merged into an existing [`ServerSummary`].
///
/// `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsPatch {
    #[serde(default)]
    pub cpu_usage_pct: Option<f64>,
    #[serde(default)]
    pub mem_usage_pct: Option<f64>,
    #[serde(default)]
    pub disk_max_pct: Option<f64>,
    #[serde(default)]
    pub status: Option<ServerStatus>,
}

impl MetricsPatch {
    pub fn status_only(status: ServerStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cpu_usage_pct.is_none()
            && self.mem_usage_pct.is_none()
            && self.disk_max_pct.is_none()
            && self.status.is_none()
    }

    /// Merge into `server`, returning true when any field changed.
    pub fn merge_into(&self, server: &mut ServerSummary) -> bool {
        let before = (
            server.cpu_usage_pct,
            server.mem_usage_pct,
            server.disk_max_pct,
            server.status,
        );

        if let Some(cpu) = self.cpu_usage_pct {
            server.cpu_usage_pct = Some(cpu);
        }
        if let Some(mem) = self.mem_usage_pct {
            server.mem_usage_pct = Some(mem);
        }
        if let Some(disk) = self.disk_max_pct {
            server.disk_max_pct = Some(disk);
        }
        if let Some(status) = self.status {
            server.status = status;
        }

        before
            != (
                server.cpu_usage_pct,
                server.mem_usage_pct,
                server.disk_max_pct,
                server.status,
            )
    }
}
