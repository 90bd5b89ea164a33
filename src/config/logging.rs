//! `[logging]` section: level, output format, per-module overrides.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// How log lines are written to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Coloured, multi-line output for a terminal
    #[default]
    Pretty,
    /// One JSON object per line, for shipping to a log collector
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

/// Crate modules that accept a level override.
pub const COMPONENTS: &[&str] = &["api", "cli", "session", "store", "stream", "sync", "view"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    /// Overrides keyed by module, e.g. `stream = "debug"` to trace reconnects
    /// while the rest of the client stays at `level`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_levels: Option<HashMap<String, String>>,
}

impl LoggingConfig {
    /// First override naming a module this crate doesn't have, in sorted order.
    pub fn unknown_component(&self) -> Option<&str> {
        let mut names: Vec<&str> = self
            .component_levels
            .iter()
            .flat_map(|levels| levels.keys())
            .map(String::as_str)
            .filter(|name| !COMPONENTS.contains(name))
            .collect();
        names.sort_unstable();
        names.first().copied()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            component_levels: None,
        }
    }
}
