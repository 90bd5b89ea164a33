//! Snapshot + stream orchestration.
//!
//! [`DashboardSync`] loads the REST snapshot into the live store, routes
//! stream events into it, and optionally re-loads the snapshot on a fixed
//! period so that anything missed while disconnected is eventually repaired.
//! Snapshot replies and stream events are applied in whatever order they
//! reach the store; the later one wins.

mod source;

pub use source::SnapshotSource;

use crate::api::ApiError;
use crate::store::{Mutation, StoreError, StoreHandle};
use crate::stream::{dispatch, ConnectionState, LiveConnection, StreamHandle};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Errors surfaced by the orchestrator.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SyncError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SyncError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, SyncError::Api(ApiError::Unauthorized))
    }
}

/// Progress of the bulk snapshot load.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Loading,
    Ready,
    Failed(String),
    /// The backend rejected the token. The session is over: the stream and
    /// the refresh loop have been stopped.
    Unauthorized,
}

impl LoadState {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, LoadState::Unauthorized)
    }
}

/// Keeps the live store in step with the backend.
#[derive(Clone)]
pub struct DashboardSync {
    source: Arc<dyn SnapshotSource>,
    store: StoreHandle,
    refresh: Option<Duration>,
    load_state: Arc<watch::Sender<LoadState>>,
}

/// Running sync. Dropping it stops the stream and the refresh loop.
pub struct SyncHandle {
    cancel_token: CancellationToken,
    stream: Option<StreamHandle>,
    refresh: Option<JoinHandle<()>>,
}

impl SyncHandle {
    pub fn stream_state(&self) -> ConnectionState {
        self.stream
            .as_ref()
            .map_or(ConnectionState::Disabled, StreamHandle::state)
    }

    /// True once the sync has been stopped, by shutdown or by a rejected token.
    pub fn is_stopped(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    pub fn stream_state_changes(&self) -> Option<watch::Receiver<ConnectionState>> {
        self.stream.as_ref().map(StreamHandle::state_changes)
    }

    /// Stop the stream and the refresh loop and wait for both.
    pub async fn shutdown(mut self) {
        self.cancel_token.cancel();
        if let Some(refresh) = self.refresh.take() {
            let _ = refresh.await;
        }
        if let Some(stream) = self.stream.take() {
            stream.shutdown().await;
        }
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

impl DashboardSync {
    pub fn new(source: Arc<dyn SnapshotSource>, store: StoreHandle) -> Self {
        let (load_state, _) = watch::channel(LoadState::Loading);
        Self {
            source,
            store,
            refresh: None,
            load_state: Arc::new(load_state),
        }
    }

    /// Re-load the snapshot every `period` while running. Zero disables.
    pub fn with_refresh(mut self, period: Duration) -> Self {
        self.refresh = (!period.is_zero()).then_some(period);
        self
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state.borrow().clone()
    }

    pub fn load_state_changes(&self) -> watch::Receiver<LoadState> {
        self.load_state.subscribe()
    }

    /// Fetch summary, servers and active alerts concurrently and replace the
    /// store's contents with them. If any fetch fails nothing is applied.
    pub async fn load_snapshot(&self) -> Result<(), SyncError> {
        self.load_state.send_replace(LoadState::Loading);

        match self.fetch_and_apply().await {
            Ok(()) => {
                self.load_state.send_replace(LoadState::Ready);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load dashboard snapshot");
                self.load_state.send_replace(Self::failure_state(&e));
                Err(e)
            }
        }
    }

    fn failure_state(error: &SyncError) -> LoadState {
        if error.is_unauthorized() {
            LoadState::Unauthorized
        } else {
            LoadState::Failed(error.to_string())
        }
    }

    async fn fetch_and_apply(&self) -> Result<(), SyncError> {
        let (summary, servers, alerts) = tokio::try_join!(
            self.source.load_summary(),
            self.source.load_servers(),
            self.source.load_active_alerts(),
        )?;

        tracing::debug!(
            servers = servers.len(),
            alerts = alerts.len(),
            "Dashboard snapshot fetched"
        );

        self.store.apply(Mutation::SetSummary(summary)).await?;
        self.store.apply(Mutation::SetServers(servers)).await?;
        self.store.apply(Mutation::SetAlerts(alerts)).await?;
        Ok(())
    }

    /// Open the stream, load the snapshot, and start the refresh loop.
    ///
    /// The stream is opened before the snapshot request is issued. A failed
    /// load is published as [`LoadState::Failed`] and the sync keeps running,
    /// except for [`ApiError::Unauthorized`], which tears everything down and
    /// is returned.
    pub async fn start(
        &self,
        connection: LiveConnection,
        parent: &CancellationToken,
    ) -> Result<SyncHandle, SyncError> {
        let cancel_token = parent.child_token();

        let store = self.store.clone();
        let stream = connection.spawn(
            move |event| {
                let kind = event.kind();
                if let Some(mutation) = dispatch::mutation_for(event) {
                    if store.submit(mutation).is_err() {
                        tracing::debug!(kind, "Store closed, dropping stream event");
                    }
                }
            },
            &cancel_token,
        );

        if let Err(e) = self.load_snapshot().await {
            if e.is_unauthorized() {
                cancel_token.cancel();
                stream.shutdown().await;
                return Err(e);
            }
        }

        let refresh = self
            .refresh
            .map(|period| self.clone().spawn_refresh(period, cancel_token.clone()));

        Ok(SyncHandle {
            cancel_token,
            stream: Some(stream),
            refresh,
        })
    }

    fn spawn_refresh(self, period: Duration, cancel_token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            tracing::info!(
                interval_seconds = period.as_secs(),
                "Snapshot refresh started"
            );

            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => {
                        tracing::debug!("Snapshot refresh shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        match self.fetch_and_apply().await {
                            Ok(()) => {
                                self.load_state.send_replace(LoadState::Ready);
                            }
                            Err(e) if e.is_unauthorized() => {
                                tracing::warn!("Snapshot refresh unauthorized, ending session");
                                self.load_state.send_replace(LoadState::Unauthorized);
                                // Tears down the stream along with this loop
                                cancel_token.cancel();
                                break;
                            }
                            Err(e) => {
                                // Keep showing the last good data
                                tracing::warn!(error = %e, "Snapshot refresh failed");
                            }
                        }
                    }
                }
            }
        })
    }

    /// Acknowledge an alert on the backend, then locally.
    ///
    /// The local flag only flips once the backend has accepted the call.
    pub async fn acknowledge_alert(&self, alert_id: u64) -> Result<(), SyncError> {
        self.source.acknowledge(alert_id).await?;
        self.store.apply(Mutation::AcknowledgeAlert(alert_id)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{
        ActiveAlert, DashboardSummary, LiveStore, ServerStatus, ServerSummary, Severity,
        StoreConfig,
    };
    use crate::stream::StreamConfig;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    #[derive(Default)]
    struct FakeSource {
        fail_alerts: AtomicBool,
        unauthorized: AtomicBool,
        reject_ack: AtomicBool,
        summary_calls: AtomicU32,
    }

    fn server(id: u64) -> ServerSummary {
        ServerSummary {
            server_id: id,
            display_name: format!("srv-{}", id),
            ip_address: format!("10.0.0.{}", id),
            os_type: "linux".to_string(),
            group_name: "web".to_string(),
            status: ServerStatus::Online,
            cpu_usage_pct: Some(10.0),
            mem_usage_pct: None,
            disk_max_pct: None,
            last_collected_at: None,
            active_alerts: 0,
        }
    }

    fn alert(id: u64) -> ActiveAlert {
        ActiveAlert {
            alert_id: id,
            server_id: 1,
            server_name: "srv-1".to_string(),
            severity: Severity::Critical,
            metric_name: Some("cpu".to_string()),
            metric_value: Some(97.0),
            threshold_value: Some(90.0),
            message: "CPU high".to_string(),
            acknowledged: false,
            created_at: "2024-05-01 10:00:00".to_string(),
            duration_seconds: 30,
        }
    }

    #[async_trait]
    impl SnapshotSource for FakeSource {
        async fn load_summary(&self) -> Result<DashboardSummary, ApiError> {
            self.summary_calls.fetch_add(1, Ordering::SeqCst);
            if self.unauthorized.load(Ordering::SeqCst) {
                return Err(ApiError::Unauthorized);
            }
            Ok(DashboardSummary {
                total_servers: 2,
                ..Default::default()
            })
        }

        async fn load_servers(&self) -> Result<Vec<ServerSummary>, ApiError> {
            Ok(vec![server(1), server(2)])
        }

        async fn load_active_alerts(&self) -> Result<Vec<ActiveAlert>, ApiError> {
            if self.fail_alerts.load(Ordering::SeqCst) {
                return Err(ApiError::Http(500));
            }
            Ok(vec![alert(7)])
        }

        async fn acknowledge(&self, _alert_id: u64) -> Result<(), ApiError> {
            if self.reject_ack.load(Ordering::SeqCst) {
                return Err(ApiError::Http(404));
            }
            Ok(())
        }
    }

    fn disabled_stream() -> LiveConnection {
        LiveConnection::new(
            "ws://127.0.0.1:1/ws/dashboard",
            StreamConfig {
                enabled: false,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_load_snapshot_populates_store() {
        let cancel = CancellationToken::new();
        let (store, _join) = LiveStore::spawn(&StoreConfig::default(), cancel.clone());
        let sync = DashboardSync::new(Arc::new(FakeSource::default()), store.clone());

        sync.load_snapshot().await.unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.servers.len(), 2);
        assert_eq!(snapshot.alerts.len(), 1);
        assert_eq!(snapshot.summary.as_ref().unwrap().total_servers, 2);
        assert_eq!(sync.load_state(), LoadState::Ready);
        cancel.cancel();
    }

    #[tokio::test]
    async fn test_load_snapshot_all_or_nothing() {
        let cancel = CancellationToken::new();
        let (store, _join) = LiveStore::spawn(&StoreConfig::default(), cancel.clone());
        let source = FakeSource::default();
        source.fail_alerts.store(true, Ordering::SeqCst);
        let sync = DashboardSync::new(Arc::new(source), store.clone());

        let err = sync.load_snapshot().await.unwrap_err();
        assert_eq!(err, SyncError::Api(ApiError::Http(500)));

        let snapshot = store.snapshot();
        assert!(snapshot.servers.is_empty());
        assert!(snapshot.summary.is_none());
        assert_eq!(snapshot.version, 0);
        assert!(matches!(sync.load_state(), LoadState::Failed(msg) if msg.contains("500")));
        cancel.cancel();
    }

    #[tokio::test]
    async fn test_acknowledge_only_after_backend_accepts() {
        let cancel = CancellationToken::new();
        let (store, _join) = LiveStore::spawn(&StoreConfig::default(), cancel.clone());
        let source = Arc::new(FakeSource::default());
        let sync = DashboardSync::new(source.clone(), store.clone());
        sync.load_snapshot().await.unwrap();

        source.reject_ack.store(true, Ordering::SeqCst);
        assert!(sync.acknowledge_alert(7).await.is_err());
        assert!(!store.snapshot().alerts[0].acknowledged);

        source.reject_ack.store(false, Ordering::SeqCst);
        sync.acknowledge_alert(7).await.unwrap();
        assert!(store.snapshot().alerts[0].acknowledged);
        cancel.cancel();
    }

    #[tokio::test]
    async fn test_start_with_stream_disabled() {
        let cancel = CancellationToken::new();
        let (store, _join) = LiveStore::spawn(&StoreConfig::default(), cancel.clone());
        let sync = DashboardSync::new(Arc::new(FakeSource::default()), store.clone());

        let handle = sync.start(disabled_stream(), &cancel).await.unwrap();
        assert_eq!(handle.stream_state(), ConnectionState::Disabled);
        assert_eq!(store.snapshot().servers.len(), 2);

        handle.shutdown().await;
        cancel.cancel();
    }

    #[tokio::test]
    async fn test_start_keeps_running_after_failed_load() {
        let cancel = CancellationToken::new();
        let (store, _join) = LiveStore::spawn(&StoreConfig::default(), cancel.clone());
        let source = FakeSource::default();
        source.fail_alerts.store(true, Ordering::SeqCst);
        let sync = DashboardSync::new(Arc::new(source), store);

        let handle = sync.start(disabled_stream(), &cancel).await.unwrap();
        assert!(matches!(sync.load_state(), LoadState::Failed(_)));

        handle.shutdown().await;
        cancel.cancel();
    }

    #[tokio::test]
    async fn test_start_unauthorized_is_returned() {
        let cancel = CancellationToken::new();
        let (store, _join) = LiveStore::spawn(&StoreConfig::default(), cancel.clone());
        let source = FakeSource::default();
        source.unauthorized.store(true, Ordering::SeqCst);
        let sync = DashboardSync::new(Arc::new(source), store);

        let result = sync.start(disabled_stream(), &cancel).await;
        assert!(matches!(result, Err(ref e) if e.is_unauthorized()));
        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_reloads_periodically() {
        let cancel = CancellationToken::new();
        let (store, _join) = LiveStore::spawn(&StoreConfig::default(), cancel.clone());
        let source = Arc::new(FakeSource::default());
        let sync = DashboardSync::new(source.clone(), store).with_refresh(Duration::from_secs(10));

        let handle = sync.start(disabled_stream(), &cancel).await.unwrap();
        assert_eq!(source.summary_calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(source.summary_calls.load(Ordering::SeqCst), 3);

        handle.shutdown().await;
        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_unauthorized_ends_session() {
        let cancel = CancellationToken::new();
        let (store, _join) = LiveStore::spawn(&StoreConfig::default(), cancel.clone());
        let source = Arc::new(FakeSource::default());
        let sync = DashboardSync::new(source.clone(), store).with_refresh(Duration::from_secs(10));

        let handle = sync.start(disabled_stream(), &cancel).await.unwrap();
        assert_eq!(sync.load_state(), LoadState::Ready);
        assert!(!handle.is_stopped());

        source.unauthorized.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(15)).await;

        assert_eq!(sync.load_state(), LoadState::Unauthorized);
        assert!(handle.is_stopped());
        assert!(!cancel.is_cancelled());

        // No further refresh attempts after the session ended
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(source.summary_calls.load(Ordering::SeqCst), 2);

        handle.shutdown().await;
        cancel.cancel();
    }

    #[tokio::test]
    async fn test_start_unauthorized_publishes_state() {
        let cancel = CancellationToken::new();
        let (store, _join) = LiveStore::spawn(&StoreConfig::default(), cancel.clone());
        let source = FakeSource::default();
        source.unauthorized.store(true, Ordering::SeqCst);
        let sync = DashboardSync::new(Arc::new(source), store);

        assert!(sync.start(disabled_stream(), &cancel).await.is_err());
        assert!(sync.load_state().is_unauthorized());
        cancel.cancel();
    }

    #[tokio::test]
    async fn test_zero_refresh_disables() {
        let cancel = CancellationToken::new();
        let (store, _join) = LiveStore::spawn(&StoreConfig::default(), cancel.clone());
        let sync = DashboardSync::new(Arc::new(FakeSource::default()), store)
            .with_refresh(Duration::ZERO);
        assert!(sync.refresh.is_none());
        cancel.cancel();
    }
}
