//! Shared test utilities for ServerEye integration tests.
//!
//! Provides builders for store types and backend JSON, plus an in-process
//! WebSocket server that stands in for the backend's live stream.

#![allow(dead_code)]

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};
use servereye::config::ApiConfig;
use servereye::store::{ActiveAlert, ServerStatus, ServerSummary, Severity};
use servereye::stream::{ConnectionState, StreamConfig};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;

// =============================================================================
// Store Builders
// =============================================================================

pub fn make_server(id: u64) -> ServerSummary {
    ServerSummary {
        server_id: id,
        display_name: format!("srv-{}", id),
        ip_address: format!("10.0.0.{}", id),
        os_type: "linux".to_string(),
        group_name: "web".to_string(),
        status: ServerStatus::Online,
        cpu_usage_pct: Some(10.0),
        mem_usage_pct: Some(20.0),
        disk_max_pct: Some(30.0),
        last_collected_at: Some("2024-05-01 10:00:00".to_string()),
        active_alerts: 0,
    }
}

pub fn make_alert(id: u64) -> ActiveAlert {
    ActiveAlert {
        alert_id: id,
        server_id: 1,
        server_name: "srv-1".to_string(),
        severity: Severity::Warning,
        metric_name: Some("cpu_usage_pct".to_string()),
        metric_value: Some(81.0),
        threshold_value: Some(80.0),
        message: format!("alert {}", id),
        acknowledged: false,
        created_at: "2024-05-01 10:00:00".to_string(),
        duration_seconds: 60,
    }
}

// =============================================================================
// Backend JSON
// =============================================================================

pub fn server_json(id: u64) -> Value {
    serde_json::to_value(make_server(id)).unwrap()
}

pub fn alert_json(id: u64) -> Value {
    serde_json::to_value(make_alert(id)).unwrap()
}

pub fn summary_json(total: u32) -> Value {
    json!({
        "total_servers": total,
        "status_counts": {"online": total},
        "avg_cpu": 12.5,
        "avg_mem": 40.0,
        "active_alerts": 1,
        "unacknowledged_alerts": 1,
        "today_alert_count": 3,
        "uptime_pct": 99.9
    })
}

pub fn metrics_frame(server_id: u64, cpu: f64) -> String {
    json!({
        "type": "metrics",
        "server_id": server_id,
        "server_name": format!("srv-{}", server_id),
        "status": "online",
        "data": {"cpu_usage_pct": cpu, "mem_usage_pct": 55.0, "disk_max_pct": 60.0},
        "timestamp": "2024-05-01 10:00:05"
    })
    .to_string()
}

pub fn alert_fired_frame(alert_id: u64, server_id: u64) -> String {
    json!({
        "type": "alert_fired",
        "alert_id": alert_id,
        "server_id": server_id,
        "server_name": format!("srv-{}", server_id),
        "severity": "critical",
        "metric_name": "cpu_usage_pct",
        "metric_value": 97.2,
        "threshold_value": 90.0,
        "message": "CPU usage critical",
        "timestamp": "2024-05-01 10:00:06"
    })
    .to_string()
}

pub fn alert_resolved_frame(alert_id: u64, server_id: u64) -> String {
    json!({
        "type": "alert_resolved",
        "alert_id": alert_id,
        "server_id": server_id,
        "timestamp": "2024-05-01 10:05:00"
    })
    .to_string()
}

pub fn api_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        timeout_seconds: 2,
        ..Default::default()
    }
}

pub fn fast_stream_config(reconnect_delay_ms: u64) -> StreamConfig {
    StreamConfig {
        enabled: true,
        reconnect_delay_ms,
        keepalive_seconds: 0,
    }
}

// =============================================================================
// WebSocket Test Server
// =============================================================================

/// Instruction pushed to every connected client.
#[derive(Debug, Clone)]
pub enum ServerFrame {
    Text(String),
    Close,
}

struct Shared {
    connections: AtomicUsize,
    pings: AtomicUsize,
    frames: broadcast::Sender<ServerFrame>,
}

/// In-process stand-in for the backend's live stream endpoints.
pub struct WsTestServer {
    pub addr: SocketAddr,
    shared: Arc<Shared>,
    cancel_token: CancellationToken,
}

impl WsTestServer {
    pub async fn start() -> Self {
        let (frames, _) = broadcast::channel(64);
        let shared = Arc::new(Shared {
            connections: AtomicUsize::new(0),
            pings: AtomicUsize::new(0),
            frames,
        });

        let app = Router::new()
            .route("/ws/dashboard", get(upgrade))
            .route("/ws/server/:id", get(upgrade))
            .with_state(Arc::clone(&shared));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let cancel_token = CancellationToken::new();
        let shutdown = cancel_token.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await
                .unwrap();
        });

        Self {
            addr,
            shared,
            cancel_token,
        }
    }

    /// `http://` origin, as configured for the REST client.
    pub fn http_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn dashboard_url(&self) -> String {
        format!("ws://{}/ws/dashboard", self.addr)
    }

    pub fn connections(&self) -> usize {
        self.shared.connections.load(Ordering::SeqCst)
    }

    pub fn pings(&self) -> usize {
        self.shared.pings.load(Ordering::SeqCst)
    }

    pub fn send_text(&self, text: impl Into<String>) {
        let _ = self.shared.frames.send(ServerFrame::Text(text.into()));
    }

    pub fn close_all(&self) {
        let _ = self.shared.frames.send(ServerFrame::Close);
    }

    /// Wait until at least `n` connections have been accepted.
    pub async fn wait_for_connections(&self, n: usize) {
        wait_until(Duration::from_secs(5), || self.connections() >= n).await;
    }
}

impl Drop for WsTestServer {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

async fn upgrade(ws: WebSocketUpgrade, State(shared): State<Arc<Shared>>) -> Response {
    ws.on_upgrade(move |socket| serve_socket(socket, shared))
}

async fn serve_socket(mut socket: WebSocket, shared: Arc<Shared>) {
    // Subscribe before counting so frames sent after the count is observed arrive
    let mut frames = shared.frames.subscribe();
    shared.connections.fetch_add(1, Ordering::SeqCst);

    loop {
        tokio::select! {
            frame = frames.recv() => match frame {
                Ok(ServerFrame::Text(text)) => {
                    if socket.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Ok(ServerFrame::Close) | Err(_) => {
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                }
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) if text == "ping" => {
                    shared.pings.fetch_add(1, Ordering::SeqCst);
                    let _ = socket.send(Message::Text("pong".to_string())).await;
                }
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
        }
    }
}

// =============================================================================
// Waiting
// =============================================================================

/// Poll `condition` every 10ms until it holds; panic after `timeout`.
pub async fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + timeout;
    while !condition() {
        if tokio::time::Instant::now() >= deadline {
            panic!("condition not met within {:?}", timeout);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Wait until the connection reports `target`.
pub async fn wait_for_state(rx: &mut watch::Receiver<ConnectionState>, target: ConnectionState) {
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| *s == target))
        .await
        .unwrap_or_else(|_| panic!("never reached {}", target))
        .unwrap();
}
