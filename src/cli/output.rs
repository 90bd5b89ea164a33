//! Output formatting helpers for CLI commands

use crate::store::{ActiveAlert, DashboardSummary, ServerStatus, ServerSummary, Severity};
use crate::stream::ConnectionState;
use crate::sync::LoadState;
use crate::view::{
    format_duration, format_percent, format_relative, gauge_level, GaugeLevel,
};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

pub fn status_label(status: ServerStatus) -> String {
    match status {
        ServerStatus::Online => "online".green().to_string(),
        ServerStatus::Warning => "warning".yellow().to_string(),
        ServerStatus::Critical => "critical".red().bold().to_string(),
        ServerStatus::Offline => "offline".dimmed().to_string(),
        ServerStatus::Maintenance => "maintenance".magenta().to_string(),
        ServerStatus::Unknown => "unknown".dimmed().to_string(),
    }
}

pub fn severity_label(severity: Severity) -> String {
    match severity {
        Severity::Critical => "critical".red().bold().to_string(),
        Severity::Warning => "warning".yellow().to_string(),
    }
}

/// Percentage coloured by gauge band.
pub fn gauge_cell(value: Option<f64>) -> String {
    let text = format_percent(value);
    match value.map(gauge_level) {
        Some(GaugeLevel::Critical) => text.red().to_string(),
        Some(GaugeLevel::Warning) => text.yellow().to_string(),
        Some(GaugeLevel::Ok) => text.green().to_string(),
        None => text,
    }
}

/// Format servers as a table
pub fn format_servers_table(servers: &[&ServerSummary]) -> String {
    let mut table = new_table(vec![
        "ID", "Name", "IP", "Group", "Status", "CPU", "Mem", "Disk", "Alerts", "Last seen",
    ]);

    for s in servers {
        table.add_row(vec![
            Cell::new(s.server_id),
            Cell::new(&s.display_name),
            Cell::new(&s.ip_address),
            Cell::new(if s.group_name.is_empty() { "-" } else { s.group_name.as_str() }),
            Cell::new(status_label(s.status)),
            Cell::new(gauge_cell(s.cpu_usage_pct)),
            Cell::new(gauge_cell(s.mem_usage_pct)),
            Cell::new(gauge_cell(s.disk_max_pct)),
            Cell::new(s.active_alerts),
            Cell::new(format_relative(s.last_collected_at.as_deref())),
        ]);
    }

    table.to_string()
}

/// Format alerts as a table, in the order given.
pub fn format_alerts_table(alerts: &[ActiveAlert]) -> String {
    let mut table = new_table(vec![
        "ID", "Severity", "Server", "Metric", "Value", "Message", "Age", "Ack",
    ]);

    for a in alerts {
        let value = match (a.metric_value, a.threshold_value) {
            (Some(v), Some(t)) => format!("{:.1} / {:.1}", v, t),
            (Some(v), None) => format!("{:.1}", v),
            _ => "-".to_string(),
        };
        table.add_row(vec![
            Cell::new(a.alert_id),
            Cell::new(severity_label(a.severity)),
            Cell::new(&a.server_name),
            Cell::new(a.metric_name.as_deref().unwrap_or("-")),
            Cell::new(value),
            Cell::new(&a.message),
            Cell::new(format_duration(Some(a.duration_seconds))),
            Cell::new(if a.acknowledged { "✓" } else { "" }),
        ]);
    }

    table.to_string()
}

/// Format the aggregate summary as a single-row table
pub fn format_summary_table(summary: &DashboardSummary) -> String {
    let mut table = new_table(vec![
        "Servers", "Online", "Warning", "Critical", "Offline", "Avg CPU", "Avg Mem", "Alerts",
        "Uptime",
    ]);
    let counts = &summary.status_counts;

    table.add_row(vec![
        Cell::new(summary.total_servers),
        Cell::new(counts.get(ServerStatus::Online)),
        Cell::new(counts.get(ServerStatus::Warning)),
        Cell::new(counts.get(ServerStatus::Critical)),
        Cell::new(counts.get(ServerStatus::Offline)),
        Cell::new(format_percent(Some(summary.avg_cpu))),
        Cell::new(format_percent(Some(summary.avg_mem))),
        Cell::new(format!(
            "{} ({} new)",
            summary.active_alerts, summary.unacknowledged_alerts
        )),
        Cell::new(format_percent(Some(summary.uptime_pct))),
    ]);

    table.to_string()
}

/// Format a snapshot as JSON
pub fn format_snapshot_json(
    summary: Option<&DashboardSummary>,
    servers: &[&ServerSummary],
    alerts: &[ActiveAlert],
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({
        "summary": summary,
        "servers": servers,
        "alerts": alerts,
    }))
}

/// Format alerts as JSON
pub fn format_alerts_json(alerts: &[ActiveAlert]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({ "alerts": alerts }))
}

/// `Groups: db, web`, or `None` when no server carries a group.
pub fn format_groups_line(groups: &[String]) -> Option<String> {
    if groups.is_empty() {
        return None;
    }
    Some(format!("Groups: {}", groups.join(", ")))
}

/// Header line for the watch screen.
pub fn format_status_line(state: ConnectionState, load: &LoadState, version: u64) -> String {
    let stream = match state {
        ConnectionState::Connected => "● live".green().to_string(),
        ConnectionState::Connecting => "○ connecting".yellow().to_string(),
        ConnectionState::AwaitingReconnect => "○ reconnecting".yellow().to_string(),
        ConnectionState::Disconnected => "○ disconnected".dimmed().to_string(),
        ConnectionState::Disabled => "○ stream off".dimmed().to_string(),
    };
    let load = match load {
        LoadState::Loading => "loading…".dimmed().to_string(),
        LoadState::Ready => String::new(),
        LoadState::Failed(msg) => format!("snapshot failed: {}", msg).red().to_string(),
        LoadState::Unauthorized => "session expired, log in again".red().to_string(),
    };
    format!("ServerEye  {}  v{}  {}", stream, version, load)
        .trim_end()
        .to_string()
}
