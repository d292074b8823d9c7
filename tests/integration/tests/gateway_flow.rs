//! End-to-end gateway tests over a real socket.
//!
//! Each test starts a gateway on an ephemeral port, opens `/sse` streams with
//! reqwest, and posts JSON-RPC messages to `/messages`.

use mapgate_core::SecretString;
use mapgate_integration_tests::{tool_call, RecordingTool, SseClient, TestGateway};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_bound_credential_reaches_tool() {
    let geocode = RecordingTool::new("maps_geocode");
    let gateway = TestGateway::start(vec![geocode.clone()], None).await;

    let mut client = SseClient::connect(&gateway.base).await;
    let catalog = client.next_message().await;
    assert_eq!(catalog["method"], "notifications/tools/catalog");
    assert_eq!(catalog["params"]["tools"][0]["name"], "maps_geocode");

    // Credential-binding request, then the invocation on the same channel.
    let response = gateway
        .post(
            &client.session_id,
            Some("K1"),
            json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}),
        )
        .await;
    assert_eq!(response.status(), 202);
    assert_eq!(client.next_message().await["id"], 1);

    let response = gateway
        .post(
            &client.session_id,
            None,
            tool_call(2, "maps_geocode", json!({"address": "1600 Amphitheatre Parkway"})),
        )
        .await;
    assert_eq!(response.status(), 202);

    let reply = client.next_message().await;
    assert_eq!(reply["id"], 2);
    assert!(reply["result"].get("isError").is_none());
    let text = reply["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("1600 Amphitheatre Parkway"));

    assert_eq!(
        geocode.calls(),
        vec![(Some(client.session_id.clone()), "K1".to_string())]
    );

    gateway.stop().await;
}

#[tokio::test]
async fn test_unknown_session_is_rejected_without_dispatch() {
    let geocode = RecordingTool::new("maps_geocode");
    let gateway = TestGateway::start(vec![geocode.clone()], None).await;

    let response = gateway
        .post(
            "never-opened",
            Some("K1"),
            tool_call(1, "maps_geocode", json!({"address": "x"})),
        )
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(
        response.text().await.unwrap(),
        "No transport found for sessionId"
    );
    assert!(geocode.calls().is_empty());
    assert!(gateway.state.credentials.is_empty());

    gateway.stop().await;
}

#[tokio::test]
async fn test_credentials_do_not_leak_between_sessions() {
    let tool = RecordingTool::new("maps_geocode");
    let gateway = TestGateway::start(vec![tool.clone()], None).await;

    let mut a = SseClient::connect(&gateway.base).await;
    let mut b = SseClient::connect(&gateway.base).await;
    a.next_message().await;
    b.next_message().await;
    assert_ne!(a.session_id, b.session_id);

    gateway
        .post(&a.session_id, Some("KA"), tool_call(1, "maps_geocode", json!({})))
        .await;
    a.next_message().await;

    // b never bound a credential and there is no default.
    gateway
        .post(&b.session_id, None, tool_call(1, "maps_geocode", json!({})))
        .await;
    let reply = b.next_message().await;
    assert_eq!(reply["result"]["isError"], true);
    assert_eq!(
        reply["result"]["content"][0]["text"],
        "No NS_API_KEY provided. Cannot authorize NS API."
    );

    gateway
        .post(&b.session_id, Some("KB"), tool_call(2, "maps_geocode", json!({})))
        .await;
    b.next_message().await;

    assert_eq!(tool.credentials(), vec!["KA".to_string(), "KB".to_string()]);

    gateway.stop().await;
}

#[tokio::test]
async fn test_default_credential_used_without_binding() {
    let tool = RecordingTool::new("maps_elevation");
    let gateway =
        TestGateway::start(vec![tool.clone()], Some(SecretString::new("ENV-KEY"))).await;

    let mut client = SseClient::connect(&gateway.base).await;
    client.next_message().await;
    gateway
        .post(&client.session_id, None, tool_call(1, "maps_elevation", json!({})))
        .await;
    client.next_message().await;

    assert_eq!(tool.credentials(), vec!["ENV-KEY".to_string()]);
    gateway.stop().await;
}

#[tokio::test]
async fn test_unknown_tool_is_a_failure_envelope() {
    let tool = RecordingTool::new("maps_geocode");
    let gateway = TestGateway::start(vec![tool.clone()], None).await;

    let mut client = SseClient::connect(&gateway.base).await;
    client.next_message().await;
    let response = gateway
        .post(&client.session_id, Some("K1"), tool_call(4, "maps_teleport", json!({})))
        .await;
    assert_eq!(response.status(), 202);

    let reply = client.next_message().await;
    assert_eq!(reply["id"], 4);
    assert_eq!(reply["result"]["isError"], true);
    assert_eq!(reply["result"]["content"][0]["text"], "Unknown tool: maps_teleport");
    assert!(tool.calls().is_empty());

    gateway.stop().await;
}

#[tokio::test]
async fn test_disconnect_tears_down_session_and_credential() {
    let gateway = TestGateway::start(vec![RecordingTool::new("maps_geocode")], None).await;

    let mut client = SseClient::connect(&gateway.base).await;
    client.next_message().await;
    let session_id = client.session_id.clone();
    gateway
        .post(&session_id, Some("K1"), json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}))
        .await;
    client.next_message().await;
    assert!(gateway.state.credentials.get(&session_id).is_some());

    drop(client);
    assert!(
        gateway
            .eventually(|state| {
                !state.sessions.contains(&session_id)
                    && state.credentials.get(&session_id).is_none()
            })
            .await,
        "session still registered after disconnect"
    );

    let response = gateway
        .post(&session_id, None, json!({"jsonrpc": "2.0", "id": 2, "method": "ping"}))
        .await;
    assert_eq!(response.status(), 400);

    gateway.stop().await;
}

#[tokio::test]
async fn test_shutdown_closes_open_streams() {
    let gateway = TestGateway::start(vec![RecordingTool::new("maps_geocode")], None).await;
    let state = Arc::clone(&gateway.state);

    let mut client = SseClient::connect(&gateway.base).await;
    client.next_message().await;
    gateway
        .post(
            &client.session_id,
            Some("K1"),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        )
        .await;

    gateway.stop().await;
    assert_eq!(state.sessions.count(), 0);
    assert!(state.credentials.is_empty());
    assert!(client.next_event().await.is_none());
}

#[tokio::test]
async fn test_discovery_endpoint() {
    let gateway = TestGateway::start(vec![RecordingTool::new("maps_geocode")], None).await;

    let value: serde_json::Value = reqwest::get(format!("{}/", gateway.base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(value["status"], "running");
    assert_eq!(value["tools"][0]["name"], "maps_geocode");
    assert_eq!(value["tools"][0]["inputSchema"]["type"], "object");

    gateway.stop().await;
}
