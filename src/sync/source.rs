//! Where snapshot data comes from.

use crate::api::{ApiClient, ApiError};
use crate::store::{ActiveAlert, DashboardSummary, ServerSummary};
use async_trait::async_trait;

/// Bulk-state provider for the dashboard.
///
/// [`ApiClient`] is the production implementation; tests substitute
/// in-memory sources.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn load_summary(&self) -> Result<DashboardSummary, ApiError>;

    async fn load_servers(&self) -> Result<Vec<ServerSummary>, ApiError>;

    async fn load_active_alerts(&self) -> Result<Vec<ActiveAlert>, ApiError>;

    /// Mark an alert acknowledged on the backend.
    async fn acknowledge(&self, alert_id: u64) -> Result<(), ApiError>;
}

#[async_trait]
impl SnapshotSource for ApiClient {
    async fn load_summary(&self) -> Result<DashboardSummary, ApiError> {
        self.fetch_summary().await
    }

    async fn load_servers(&self) -> Result<Vec<ServerSummary>, ApiError> {
        self.fetch_servers(self.server_page_size()).await
    }

    async fn load_active_alerts(&self) -> Result<Vec<ActiveAlert>, ApiError> {
        self.fetch_active_alerts().await
    }

    async fn acknowledge(&self, alert_id: u64) -> Result<(), ApiError> {
        self.acknowledge_alert(alert_id).await
    }
}
