//! REST API client configuration

use serde::{Deserialize, Serialize};

/// Largest server page the backend will serve.
pub const MAX_SERVER_PAGE_SIZE: u32 = 200;

/// Where and how to reach the monitoring backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend origin, e.g. `http://127.0.0.1:8000`
    pub base_url: String,
    /// Path prefix for REST resources
    pub prefix: String,
    pub timeout_seconds: u64,
    /// Bearer token. Overrides the one stored in the session file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// `size` query parameter for the server listing
    pub server_page_size: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            prefix: "/api/v1".to_string(),
            timeout_seconds: 10,
            token: None,
            server_page_size: MAX_SERVER_PAGE_SIZE,
        }
    }
}

impl ApiConfig {
    /// Base URL and prefix joined, without a trailing slash.
    pub fn rest_root(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let prefix = self.prefix.trim_matches('/');
        if prefix.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, prefix)
        }
    }
}
