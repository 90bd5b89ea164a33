//! Live dashboard store.
//!
//! Holds the server inventory, the active alert list and the aggregate
//! summary. The initial REST snapshot replaces collections wholesale; stream
//! events patch them incrementally. [`DashboardStore`] is the plain state
//! container with total, synchronous operations; [`LiveStore`] wraps it in a
//! single writer task that publishes snapshots to readers.

mod alerts;
mod config;
mod live;
mod types;


pub use alerts::*;
pub use config::*;
pub use live::*;
pub use types::*;

use serde::Serialize;
use std::collections::HashMap;

/// One store operation. Every variant is a complete state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    SetServers(Vec<ServerSummary>),
    SetSummary(DashboardSummary),
    SetAlerts(Vec<ActiveAlert>),
    UpdateServerMetrics { server_id: u64, patch: MetricsPatch },
    AddAlert(ActiveAlert),
    RemoveAlert(u64),
    AcknowledgeAlert(u64),
}

/// Notification describing a mutation that changed visible state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum StoreChange {
    ServersReplaced { count: usize },
    SummaryReplaced,
    AlertsReplaced { count: usize },
    ServerUpdated { server_id: u64 },
    AlertAdded { alert_id: u64 },
    AlertRemoved { alert_id: u64 },
    AlertAcknowledged { alert_id: u64 },
}

/// Immutable view of the store handed to readers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardSnapshot {
    /// Incremented on every state change
    pub version: u64,
    pub servers: HashMap<u64, ServerSummary>,
    /// Newest first
    pub alerts: Vec<ActiveAlert>,
    pub summary: Option<DashboardSummary>,
}

impl DashboardSnapshot {
    /// Servers ordered by id.
    pub fn server_list(&self) -> Vec<ServerSummary> {
        let mut servers: Vec<_> = self.servers.values().cloned().collect();
        servers.sort_by_key(|s| s.server_id);
        servers
    }
}

/// Authoritative dashboard state.
#[derive(Debug, Clone)]
pub struct DashboardStore {
    servers: HashMap<u64, ServerSummary>,
    alerts: AlertList,
    summary: Option<DashboardSummary>,
    version: u64,
}

impl DashboardStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            servers: HashMap::new(),
            alerts: AlertList::new(config.alert_capacity, config.dedup_alerts),
            summary: None,
            version: 0,
        }
    }

    /// Rebuild the server map from `servers`. Later duplicates of an id win.
    pub fn set_servers(&mut self, servers: Vec<ServerSummary>) -> StoreChange {
        self.servers = servers.into_iter().map(|s| (s.server_id, s)).collect();
        self.bump();
        StoreChange::ServersReplaced {
            count: self.servers.len(),
        }
    }

    pub fn set_summary(&mut self, summary: DashboardSummary) -> StoreChange {
        self.summary = Some(summary);
        self.bump();
        StoreChange::SummaryReplaced
    }

    pub fn set_alerts(&mut self, alerts: Vec<ActiveAlert>) -> StoreChange {
        self.alerts.replace(alerts);
        self.bump();
        StoreChange::AlertsReplaced {
            count: self.alerts.len(),
        }
    }

    /// Merge `patch` into an existing server. Unknown ids are ignored: the
    /// stream never creates entries, only the REST snapshot does.
    pub fn update_server_metrics(
        &mut self,
        server_id: u64,
        patch: &MetricsPatch,
    ) -> Option<StoreChange> {
        let server = self.servers.get_mut(&server_id)?;
        if !patch.merge_into(server) {
            return None;
        }
        self.bump();
        Some(StoreChange::ServerUpdated { server_id })
    }

    pub fn add_alert(&mut self, alert: ActiveAlert) -> StoreChange {
        let alert_id = alert.alert_id;
        self.alerts.push_front(alert);
        self.bump();
        StoreChange::AlertAdded { alert_id }
    }

    pub fn remove_alert(&mut self, alert_id: u64) -> Option<StoreChange> {
        if !self.alerts.remove(alert_id) {
            return None;
        }
        self.bump();
        Some(StoreChange::AlertRemoved { alert_id })
    }

    pub fn acknowledge_alert(&mut self, alert_id: u64) -> Option<StoreChange> {
        if !self.alerts.acknowledge(alert_id) {
            return None;
        }
        self.bump();
        Some(StoreChange::AlertAcknowledged { alert_id })
    }

    /// Apply a [`Mutation`], returning the change if visible state moved.
    pub fn apply(&mut self, mutation: Mutation) -> Option<StoreChange> {
        match mutation {
            Mutation::SetServers(servers) => Some(self.set_servers(servers)),
            Mutation::SetSummary(summary) => Some(self.set_summary(summary)),
            Mutation::SetAlerts(alerts) => Some(self.set_alerts(alerts)),
            Mutation::UpdateServerMetrics { server_id, patch } => {
                self.update_server_metrics(server_id, &patch)
            }
            Mutation::AddAlert(alert) => Some(self.add_alert(alert)),
            Mutation::RemoveAlert(alert_id) => self.remove_alert(alert_id),
            Mutation::AcknowledgeAlert(alert_id) => self.acknowledge_alert(alert_id),
        }
    }

    pub fn server(&self, server_id: u64) -> Option<&ServerSummary> {
        self.servers.get(&server_id)
    }

    pub fn server_count(&self) -> usize {
        self.servers.len()
    }

    pub fn alerts(&self) -> &AlertList {
        &self.alerts
    }

    pub fn summary(&self) -> Option<&DashboardSummary> {
        self.summary.as_ref()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            version: self.version,
            servers: self.servers.clone(),
            alerts: self.alerts.to_vec(),
            summary: self.summary.clone(),
        }
    }

    fn bump(&mut self) {
        self.version += 1;
    }
}

impl Default for DashboardStore {
    fn default() -> Self {
        Self::new(&StoreConfig::default())
    }
}
