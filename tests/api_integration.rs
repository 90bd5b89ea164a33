//! Integration tests for the REST client against a mock backend.

mod common;

use common::{alert_json, api_config, server_json, summary_json};
use servereye::api::{ApiClient, ApiError};
use servereye::session::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_fetch_servers_uses_page_size_and_items() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/servers"))
        .and(query_param("size", "200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [server_json(1), server_json(2)],
            "total": 2,
            "page": 1,
            "size": 200
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(&api_config(&mock_server.uri())).unwrap();
    let servers = client.fetch_servers(200).await.unwrap();

    assert_eq!(servers.len(), 2);
    assert_eq!(servers[1].display_name, "srv-2");
}

#[tokio::test]
async fn test_fetch_active_alerts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/alerts/active"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([alert_json(3), alert_json(4)])),
        )
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(&api_config(&mock_server.uri())).unwrap();
    let alerts = client.fetch_active_alerts().await.unwrap();

    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0].alert_id, 3);
    assert_eq!(alerts[0].threshold_value, Some(80.0));
}

#[tokio::test]
async fn test_fetch_summary_with_partial_counts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/dashboard/summary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(summary_json(5)))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(&api_config(&mock_server.uri())).unwrap();
    let summary = client.fetch_summary().await.unwrap();

    assert_eq!(summary.total_servers, 5);
    assert_eq!(summary.status_counts.online, 5);
    assert_eq!(summary.status_counts.critical, 0);
    assert_eq!(summary.today_alert_count, 3);
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/alerts/active"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = Arc::new(SessionStore::in_memory());
    session.set_token("secret-token").unwrap();
    let client = ApiClient::new(&api_config(&mock_server.uri()))
        .unwrap()
        .with_session(session);

    assert!(client.fetch_active_alerts().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_acknowledge_alert_puts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/alerts/17/acknowledge"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(&api_config(&mock_server.uri())).unwrap();
    client.acknowledge_alert(17).await.unwrap();
}

#[tokio::test]
async fn test_unauthorized_clears_persisted_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/dashboard/summary"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let session_path = dir.path().join("session.json");
    let session = Arc::new(SessionStore::open(&session_path).unwrap());
    session.set_token("expired").unwrap();
    session.set_dark_mode(true).unwrap();

    let client = ApiClient::new(&api_config(&mock_server.uri()))
        .unwrap()
        .with_session(Arc::clone(&session));

    let err = client.fetch_summary().await.unwrap_err();
    assert_eq!(err, ApiError::Unauthorized);
    assert!(client.token().is_none());

    let reopened = SessionStore::open(&session_path).unwrap();
    assert!(reopened.token().is_none());
    assert!(reopened.dark_mode()); // other keys untouched
}

#[tokio::test]
async fn test_server_error_maps_to_http() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/alerts/active"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(&api_config(&mock_server.uri())).unwrap();
    assert_eq!(
        client.fetch_active_alerts().await.unwrap_err(),
        ApiError::Http(503)
    );
}

#[tokio::test]
async fn test_invalid_body_maps_to_decode() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/alerts/active"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(&api_config(&mock_server.uri())).unwrap();
    assert!(matches!(
        client.fetch_active_alerts().await,
        Err(ApiError::Decode(_))
    ));
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/dashboard/summary"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(summary_json(1))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let mut config = api_config(&mock_server.uri());
    config.timeout_seconds = 1;
    let client = ApiClient::new(&config).unwrap();

    assert_eq!(client.fetch_summary().await.unwrap_err(), ApiError::Timeout(1));
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(&api_config(&format!("http://{}", addr))).unwrap();
    assert!(matches!(
        client.fetch_summary().await,
        Err(ApiError::Transport(_))
    ));
}
