//! Watch command implementation
//!
//! Loads the snapshot, opens the live stream and redraws the dashboard
//! whenever the store, the stream state or the load state changes.
//! Redraws are coalesced to at most one per `--redraw-ms`.

use crate::api::ApiError;
use crate::cli::output::{
    format_alerts_table, format_groups_line, format_servers_table, format_status_line,
    format_summary_table,
};
use crate::cli::setup::{
    build_client, init_tracing, load_config_with_overrides, open_session, shutdown_signal,
};
use crate::cli::{ViewArgs, WatchArgs};
use crate::store::{DashboardSnapshot, LiveStore};
use crate::stream::{stream_url, ConnectionState, LiveConnection, StreamScope};
use crate::sync::{DashboardSync, LoadState};
use crate::view::{filter_servers, groups, sort_servers};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

/// Most alerts shown under the server table.
const ALERT_ROWS: usize = 10;

/// Render one frame of the watch screen.
pub fn render_dashboard(
    snapshot: &DashboardSnapshot,
    view: &ViewArgs,
    server: Option<u64>,
    state: ConnectionState,
    load: &LoadState,
) -> String {
    let mut servers = filter_servers(
        snapshot
            .servers
            .values()
            .filter(|s| server.is_none_or(|id| s.server_id == id)),
        &view.filter(),
    );
    sort_servers(&mut servers, view.sort, view.direction());

    let mut out = format_status_line(state, load, snapshot.version);
    out.push('\n');

    if let Some(summary) = &snapshot.summary {
        out.push_str(&format_summary_table(summary));
        out.push('\n');
    }
    if let Some(line) = format_groups_line(&groups(snapshot.servers.values())) {
        out.push_str(&line);
        out.push('\n');
    }

    out.push_str(&format_servers_table(&servers));
    out.push('\n');

    let alerts: Vec<_> = snapshot
        .alerts
        .iter()
        .filter(|a| server.is_none_or(|id| a.server_id == id))
        .take(ALERT_ROWS)
        .cloned()
        .collect();
    if !alerts.is_empty() {
        out.push_str(&format_alerts_table(&alerts));
        out.push('\n');
    }

    out
}

/// Resolves when `rx` sees a new value; never resolves without a receiver
/// or after its sender is gone.
async fn state_changed(rx: &mut Option<watch::Receiver<ConnectionState>>) {
    match rx {
        Some(receiver) => {
            if receiver.changed().await.is_err() {
                *rx = None;
                std::future::pending::<()>().await;
            }
        }
        None => std::future::pending::<()>().await,
    }
}

/// Handle `servereye watch`
pub async fn run_watch(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config_with_overrides(&args.connect)?;
    if args.no_stream {
        config.stream.enabled = false;
    }
    if let Some(refresh) = args.refresh {
        config.store.snapshot_refresh_seconds = refresh;
    }

    init_tracing(&config.logging)?;
    tracing::debug!(?config, "Loaded configuration");

    let scope = args
        .server
        .map_or(StreamScope::Dashboard, StreamScope::Server);
    let url = stream_url(&config.api.base_url, scope)?;
    tracing::info!(%scope, url = %url, "Starting live dashboard");

    let session = open_session(&config)?;
    let client = build_client(&config, session)?;

    let cancel_token = CancellationToken::new();
    let signal = tokio::spawn(shutdown_signal(cancel_token.clone()));

    let (store, store_join) = LiveStore::spawn(&config.store, cancel_token.clone());
    let sync = DashboardSync::new(client, store.clone()).with_refresh(Duration::from_secs(
        config.store.snapshot_refresh_seconds,
    ));

    let connection = LiveConnection::new(url, config.stream.clone());
    let handle = match sync.start(connection, &cancel_token).await {
        Ok(handle) => handle,
        Err(e) => {
            cancel_token.cancel();
            let _ = store_join.await;
            let _ = signal.await;
            return Err(e.into());
        }
    };

    let mut snapshots = store.subscribe();
    let mut loads = sync.load_state_changes();
    let mut states = handle.stream_state_changes();
    let redraw = Duration::from_millis(args.redraw_ms);

    let draw = |state: ConnectionState| {
        let snapshot = store.snapshot();
        let load = sync.load_state();
        let frame = render_dashboard(&snapshot, &args.view, args.server, state, &load);
        print!("{}{}", CLEAR_SCREEN, frame);
    };
    draw(handle.stream_state());

    let mut session_expired = false;
    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    tracing::debug!("Store closed, leaving watch loop");
                    break;
                }
            }
            changed = loads.changed() => {
                if changed.is_ok() && loads.borrow_and_update().is_unauthorized() {
                    session_expired = true;
                    break;
                }
            }
            _ = state_changed(&mut states) => {}
        }

        // Coalesce bursts of changes into one redraw
        tokio::select! {
            _ = cancel_token.cancelled() => break,
            _ = tokio::time::sleep(redraw) => {}
        }
        let _ = snapshots.borrow_and_update();
        draw(handle.stream_state());
    }

    tracing::info!("Stopping live dashboard");
    handle.shutdown().await;
    cancel_token.cancel();
    let _ = store_join.await;
    let _ = signal.await;

    if session_expired {
        return Err(ApiError::Unauthorized.into());
    }
    Ok(())
}
