//! Alerts command implementation

use crate::cli::output::{format_alerts_json, format_alerts_table};
use crate::cli::setup::{build_client, load_config_with_overrides, open_session};
use crate::cli::{AlertsAckArgs, AlertsListArgs};
use crate::store::ActiveAlert;

/// Render active alerts, optionally hiding acknowledged ones.
pub fn render_alerts(
    alerts: Vec<ActiveAlert>,
    unacknowledged_only: bool,
    json: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    let alerts: Vec<ActiveAlert> = alerts
        .into_iter()
        .filter(|a| !unacknowledged_only || !a.acknowledged)
        .collect();

    if json {
        Ok(format_alerts_json(&alerts)?)
    } else {
        Ok(format_alerts_table(&alerts))
    }
}

/// Handle `servereye alerts list`
pub async fn handle_alerts_list(
    args: &AlertsListArgs,
) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(&args.connect)?;
    let client = build_client(&config, open_session(&config)?)?;

    let alerts = client.fetch_active_alerts().await?;
    tracing::debug!(count = alerts.len(), "Fetched active alerts");
    render_alerts(alerts, args.unacknowledged, args.json)
}

/// Handle `servereye alerts ack`
pub async fn handle_alerts_ack(args: &AlertsAckArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(&args.connect)?;
    let client = build_client(&config, open_session(&config)?)?;

    client.acknowledge_alert(args.alert_id).await?;
    Ok(format!("✓ Alert {} acknowledged", args.alert_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Severity;

    fn alert(id: u64, acknowledged: bool) -> ActiveAlert {
        ActiveAlert {
            alert_id: id,
            server_id: 1,
            server_name: "web-01".to_string(),
            severity: Severity::Critical,
            metric_name: None,
            metric_value: None,
            threshold_value: None,
            message: format!("alert {}", id),
            acknowledged,
            created_at: "2024-05-01 10:00:00".to_string(),
            duration_seconds: 0,
        }
    }

    #[test]
    fn test_render_alerts_hides_acknowledged() {
        let output = render_alerts(vec![alert(1, true), alert(2, false)], true, true).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        let alerts = parsed["alerts"].as_array().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0]["alert_id"], 2);
    }

    #[test]
    fn test_render_alerts_table_keeps_all() {
        let output = render_alerts(vec![alert(1, true), alert(2, false)], false, false).unwrap();
        assert!(output.contains("alert 1"));
        assert!(output.contains("alert 2"));
    }
}
