//! Display formatting for dashboard values.
//!
//! Missing values render as `-`.

use chrono::{DateTime, NaiveDateTime, Utc};

const MISSING: &str = "-";

/// Backend timestamp layout (no offset, treated as UTC).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Colour band for a usage gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeLevel {
    Ok,
    Warning,
    Critical,
}

/// `>= 90` is critical, `>= 70` is warning.
pub fn gauge_level(pct: f64) -> GaugeLevel {
    if pct >= 90.0 {
        GaugeLevel::Critical
    } else if pct >= 70.0 {
        GaugeLevel::Warning
    } else {
        GaugeLevel::Ok
    }
}

pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}%", v),
        None => MISSING.to_string(),
    }
}

/// Alert age: `45s`, `3m 5s`, `2h 10m`.
pub fn format_duration(seconds: Option<u64>) -> String {
    let Some(seconds) = seconds else {
        return MISSING.to_string();
    };
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    }
}

/// Parse a backend timestamp, either the plain layout or RFC 3339.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT) {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Human distance from now. Unparseable input is returned as-is.
pub fn format_relative(value: Option<&str>) -> String {
    format_relative_at(value, Utc::now())
}

pub fn format_relative_at(value: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return MISSING.to_string();
    };
    let Some(at) = parse_timestamp(value) else {
        return value.to_string();
    };

    let secs = (now - at).num_seconds();
    if secs < 0 {
        return "just now".to_string();
    }
    match secs {
        0..=59 => "just now".to_string(),
        60..=3599 => format!("{} min ago", secs / 60),
        3600..=86_399 => format!("{} h ago", secs / 3600),
        _ => format!("{} d ago", secs / 86_400),
    }
}
