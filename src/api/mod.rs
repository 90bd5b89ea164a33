//! REST client for the monitoring backend.
//!
//! Covers the three snapshot endpoints the dashboard loads on mount and the
//! alert acknowledge call. Every request carries the bearer token when one is
//! known; a 401 clears it everywhere before surfacing
//! [`ApiError::Unauthorized`].

mod error;
mod types;

pub use error::ApiError;
pub use types::ServerListResponse;

use crate::config::ApiConfig;
use crate::session::SessionStore;
use crate::store::{ActiveAlert, DashboardSummary, ServerSummary};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// HTTP client bound to one backend.
#[derive(Debug)]
pub struct ApiClient {
    /// HTTP client with connection pooling
    client: reqwest::Client,
    /// `base_url` + `prefix`, no trailing slash
    root: String,
    timeout_seconds: u64,
    server_page_size: u32,
    token: RwLock<Option<String>>,
    session: Option<Arc<SessionStore>>,
}

impl ApiClient {
    /// Create a client with a default HTTP client honouring `timeout_seconds`.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self::with_client(config, client))
    }

    /// Create a client around a custom HTTP client (for testing).
    pub fn with_client(config: &ApiConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            root: config.rest_root(),
            timeout_seconds: config.timeout_seconds,
            server_page_size: config.server_page_size,
            token: RwLock::new(config.token.clone().filter(|t| !t.is_empty())),
            session: None,
        }
    }

    /// Attach a session store. Its token is used unless one was configured.
    pub fn with_session(mut self, session: Arc<SessionStore>) -> Self {
        {
            let mut token = self.token.write().unwrap_or_else(PoisonError::into_inner);
            if token.is_none() {
                *token = session.token();
            }
        }
        self.session = Some(session);
        self
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Page size used when loading the full server list.
    pub fn server_page_size(&self) -> u32 {
        self.server_page_size
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// `GET /servers?size=N`, returning the page items.
    pub async fn fetch_servers(&self, page_size: u32) -> Result<Vec<ServerSummary>, ApiError> {
        let page: ServerListResponse = self
            .get_json("/servers", &[("size", page_size.to_string())])
            .await?;
        Ok(page.items)
    }

    /// `GET /alerts/active`
    pub async fn fetch_active_alerts(&self) -> Result<Vec<ActiveAlert>, ApiError> {
        self.get_json("/alerts/active", &[]).await
    }

    /// `GET /dashboard/summary`
    pub async fn fetch_summary(&self) -> Result<DashboardSummary, ApiError> {
        self.get_json("/dashboard/summary", &[]).await
    }

    /// `PUT /alerts/{id}/acknowledge`. The response body is ignored.
    pub async fn acknowledge_alert(&self, alert_id: u64) -> Result<(), ApiError> {
        let url = self.url(&format!("/alerts/{}/acknowledge", alert_id));
        self.send(self.client.put(&url), "alerts.acknowledge").await?;
        tracing::info!(alert_id, "Alert acknowledged");
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.root, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self.send(self.client.get(&url).query(query), path).await?;
        let body = response.text().await.map_err(|e| self.classify_error(e))?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(path, error = %e, "Failed to decode response body");
            ApiError::Decode(e.to_string())
        })
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        endpoint: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let request = match self.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            metrics::counter!("servereye_api_requests_total",
                "endpoint" => endpoint.to_string(),
                "outcome" => "error"
            )
            .increment(1);
            self.classify_error(e)
        })?;

        let status = response.status();
        metrics::counter!("servereye_api_requests_total",
            "endpoint" => endpoint.to_string(),
            "outcome" => status.as_u16().to_string()
        )
        .increment(1);

        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized();
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            tracing::debug!(endpoint, status = status.as_u16(), "Request failed");
            return Err(ApiError::Http(status.as_u16()));
        }

        Ok(response)
    }

    fn handle_unauthorized(&self) {
        self.set_token(None);
        if let Some(session) = &self.session {
            if let Err(e) = session.clear_token() {
                tracing::warn!(error = %e, "Failed to clear stored token");
            }
        }
        tracing::warn!("Backend returned 401, token cleared");
    }

    fn classify_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout(self.timeout_seconds)
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}
