//! Maps stream events to store mutations.

use super::events::StreamEvent;
use crate::store::{ActiveAlert, MetricsPatch, Mutation, Severity};

/// The single store mutation an event implies, or `None` for unknown types.
pub fn mutation_for(event: StreamEvent) -> Option<Mutation> {
    match event {
        StreamEvent::Metrics(metrics) => Some(Mutation::UpdateServerMetrics {
            server_id: metrics.server_id,
            patch: MetricsPatch {
                cpu_usage_pct: metrics.data.cpu_usage_pct,
                mem_usage_pct: metrics.data.mem_usage_pct,
                disk_max_pct: metrics.data.disk_max_pct,
                status: metrics.status,
            },
        }),
        StreamEvent::AlertFired(fired) => Some(Mutation::AddAlert(ActiveAlert {
            alert_id: fired.alert_id,
            server_id: fired.server_id,
            server_name: fired.server_name,
            severity: Severity::parse_or_warning(fired.severity.as_deref()),
            metric_name: fired.metric_name,
            metric_value: fired.metric_value,
            threshold_value: fired.threshold_value,
            message: fired.message,
            acknowledged: false,
            created_at: fired.timestamp,
            duration_seconds: 0,
        })),
        StreamEvent::AlertResolved(resolved) => Some(Mutation::RemoveAlert(resolved.alert_id)),
        StreamEvent::StatusChange(change) => Some(Mutation::UpdateServerMetrics {
            server_id: change.server_id,
            patch: MetricsPatch::status_only(change.new_status),
        }),
        StreamEvent::Unknown => None,
    }
}
