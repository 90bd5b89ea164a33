//! Snapshot command implementation

use crate::cli::output::{
    format_alerts_table, format_groups_line, format_servers_table, format_snapshot_json,
    format_summary_table,
};
use crate::cli::setup::{build_client, load_config_with_overrides, open_session};
use crate::cli::{SnapshotArgs, ViewArgs};
use crate::store::{DashboardSnapshot, LiveStore, ServerSummary};
use crate::sync::DashboardSync;
use crate::view::{filter_servers, groups, sort_servers};
use tokio_util::sync::CancellationToken;

/// Filtered, ordered server rows for `snapshot`.
pub fn visible_servers<'a>(
    snapshot: &'a DashboardSnapshot,
    view: &ViewArgs,
) -> Vec<&'a ServerSummary> {
    let mut servers = filter_servers(snapshot.servers.values(), &view.filter());
    sort_servers(&mut servers, view.sort, view.direction());
    servers
}

/// Render a snapshot as tables or JSON.
pub fn render_snapshot(
    snapshot: &DashboardSnapshot,
    view: &ViewArgs,
    json: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    let servers = visible_servers(snapshot, view);

    if json {
        return Ok(format_snapshot_json(
            snapshot.summary.as_ref(),
            &servers,
            &snapshot.alerts,
        )?);
    }

    let mut out = String::new();
    if let Some(summary) = &snapshot.summary {
        out.push_str(&format_summary_table(summary));
        out.push('\n');
    }
    if let Some(line) = format_groups_line(&groups(snapshot.servers.values())) {
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str(&format_servers_table(&servers));
    if !snapshot.alerts.is_empty() {
        out.push('\n');
        out.push_str(&format_alerts_table(&snapshot.alerts));
    }
    Ok(out)
}

/// Handle `servereye snapshot`
pub async fn handle_snapshot(args: &SnapshotArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(&args.connect)?;
    let session = open_session(&config)?;
    let client = build_client(&config, session)?;

    let cancel_token = CancellationToken::new();
    let (store, join) = LiveStore::spawn(&config.store, cancel_token.clone());
    let sync = DashboardSync::new(client, store.clone());

    let loaded = sync.load_snapshot().await;
    let snapshot = store.snapshot();
    cancel_token.cancel();
    let _ = join.await;

    loaded?;
    render_snapshot(&snapshot, &args.view, args.json)
}
