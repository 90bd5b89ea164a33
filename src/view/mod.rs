//! Derived dashboard views.
//!
//! Pure functions over snapshot data: filtering, ordering and the group
//! list shown in the filter bar. Nothing here touches the store.

pub mod format;

pub use format::*;

use crate::store::{ServerStatus, ServerSummary};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::str::FromStr;

/// Server list filter. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerFilter {
    pub group: Option<String>,
    pub status: Option<ServerStatus>,
    /// Case-insensitive substring of the display name or IP address
    pub search: Option<String>,
}

impl ServerFilter {
    pub fn matches(&self, server: &ServerSummary) -> bool {
        if let Some(group) = self.group.as_deref().filter(|g| !g.is_empty()) {
            if server.group_name != group {
                return false;
            }
        }
        if let Some(status) = self.status {
            if server.status != status {
                return false;
            }
        }
        if let Some(query) = self.search.as_deref().filter(|q| !q.is_empty()) {
            let query = query.to_lowercase();
            return server.display_name.to_lowercase().contains(&query)
                || server.ip_address.contains(&query);
        }
        true
    }
}

pub fn filter_servers<'a>(
    servers: impl IntoIterator<Item = &'a ServerSummary>,
    filter: &ServerFilter,
) -> Vec<&'a ServerSummary> {
    servers.into_iter().filter(|s| filter.matches(s)).collect()
}

/// Column to order the server list by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Name,
    Status,
    Cpu,
    Mem,
    Disk,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "status" => Ok(SortKey::Status),
            "cpu" => Ok(SortKey::Cpu),
            "mem" | "memory" => Ok(SortKey::Mem),
            "disk" => Ok(SortKey::Disk),
            _ => Err(format!(
                "Invalid sort key: {}. Use: name, status, cpu, mem, disk",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Missing metrics sort before any value.
fn cmp_metric(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort; ties fall back to server id.
pub fn sort_servers(servers: &mut [&ServerSummary], key: SortKey, direction: SortDirection) {
    servers.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Name => a
                .display_name
                .to_lowercase()
                .cmp(&b.display_name.to_lowercase()),
            SortKey::Status => a.status.severity_rank().cmp(&b.status.severity_rank()),
            SortKey::Cpu => cmp_metric(a.cpu_usage_pct, b.cpu_usage_pct),
            SortKey::Mem => cmp_metric(a.mem_usage_pct, b.mem_usage_pct),
            SortKey::Disk => cmp_metric(a.disk_max_pct, b.disk_max_pct),
        };
        let ordering = match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        };
        ordering.then(a.server_id.cmp(&b.server_id))
    });
}

/// Distinct non-empty group names, sorted.
pub fn groups<'a>(servers: impl IntoIterator<Item = &'a ServerSummary>) -> Vec<String> {
    servers
        .into_iter()
        .map(|s| s.group_name.as_str())
        .filter(|g| !g.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
