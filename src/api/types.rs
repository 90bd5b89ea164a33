//! Response envelopes that wrap the shared store types.

use crate::store::ServerSummary;
use serde::{Deserialize, Serialize};

/// Paged `GET /servers` response. Only `items` is used by the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerListResponse {
    pub items: Vec<ServerSummary>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
}
