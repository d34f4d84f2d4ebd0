//! HTTP transport tests, driving the router in-process.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use cupcake_mcp_server::http::{router, RPC_PATH};
use cupcake_mcp_server::query::QueryService;
use cupcake_mcp_server::store::{Record, RecordStore};
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_router() -> Router {
    let records = vec![
        Record::new("1").with_title("Chocolate Cupcake"),
        Record::new("2").with_title("Vanilla Cake"),
    ];
    let store = RecordStore::from_records(records).unwrap();
    router(Arc::new(QueryService::new(Arc::new(store))))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn get_discovery(app: &Router) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/.well-known/mcp.json")
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn post_rpc(app: &Router, body: impl Into<Body>) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(RPC_PATH)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap();
    send(app, request).await
}

fn tool_text(response: &Value) -> Value {
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    serde_json::from_str(text).unwrap()
}

#[tokio::test]
async fn discovery_document_is_served() {
    let app = test_router();
    let (status, body) = get_discovery(&app).await;

    assert_eq!(status, StatusCode::OK);
    let doc: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(doc["name"], "Cupcake MCP");
    assert_eq!(doc["instructions"], "Search cupcake orders");

    let names: Vec<&str> = doc["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["search", "fetch"]);
}

#[tokio::test]
async fn discovery_document_unchanged_by_tool_calls() {
    let app = test_router();
    let (_, before) = get_discovery(&app).await;

    for body in [
        json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call",
               "params": {"name": "search", "arguments": {"query": "cake"}}}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call",
               "params": {"name": "fetch", "arguments": {"id": "1"}}}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call",
               "params": {"name": "fetch", "arguments": {"id": "missing"}}}),
        json!({"jsonrpc": "2.0", "id": 4, "method": "tools/list"}),
    ] {
        let (status, _) = post_rpc(&app, body.to_string()).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, after) = get_discovery(&app).await;
    assert_eq!(before, after, "Discovery document must be byte-identical across calls");
}

#[tokio::test]
async fn discovery_route_only_allows_get() {
    let app = test_router();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/.well-known/mcp.json")
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn search_over_http() {
    let app = test_router();
    let body = json!({
        "jsonrpc": "2.0",
        "id": "abc",
        "method": "tools/call",
        "params": { "name": "search", "arguments": { "query": "cake" } }
    });

    let (status, bytes) = post_rpc(&app, body.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let response: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(response["jsonrpc"], "2.0");
    assert_eq!(response["id"], "abc");
    assert_eq!(tool_text(&response), json!({ "ids": ["1", "2"] }));
}

#[tokio::test]
async fn fetch_over_http() {
    let app = test_router();
    let body = json!({
        "jsonrpc": "2.0",
        "id": 7,
        "method": "tools/call",
        "params": { "name": "fetch", "arguments": { "id": "2" } }
    });

    let (status, bytes) = post_rpc(&app, body.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let response: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        tool_text(&response),
        json!({ "id": "2", "title": "Vanilla Cake", "text": "", "metadata": {} })
    );
}

#[tokio::test]
async fn fetch_not_found_over_http_is_tool_error() {
    let app = test_router();
    let body = json!({
        "jsonrpc": "2.0",
        "id": 8,
        "method": "tools/call",
        "params": { "name": "fetch", "arguments": { "id": "99" } }
    });

    let (status, bytes) = post_rpc(&app, body.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let response: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(response["result"]["isError"], true);
    assert_eq!(tool_text(&response)["error"]["code"], "not_found");
}

#[tokio::test]
async fn notification_is_accepted_without_body() {
    let app = test_router();
    let body = json!({ "jsonrpc": "2.0", "method": "notifications/initialized" });

    let (status, bytes) = post_rpc(&app, body.to_string()).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn malformed_body_is_parse_error() {
    let app = test_router();

    for body in ["{not json", "", "   "] {
        let (status, bytes) = post_rpc(&app, body.to_string()).await;
        assert_eq!(status, StatusCode::OK);

        let response: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(response["error"]["code"], -32700, "body {body:?}");
        assert_eq!(response.get("id"), Some(&Value::Null), "body {body:?}");
    }
}

#[tokio::test]
async fn json_that_is_not_a_request_is_invalid_request() {
    let app = test_router();

    let cases = [
        (json!({ "jsonrpc": "2.0", "id": 7 }), json!(7)),
        (json!({ "jsonrpc": "2.0", "id": "q", "method": 12 }), json!("q")),
        (json!({ "jsonrpc": "2.0", "id": { "nested": true }, "method": "ping" }), Value::Null),
        (json!([{ "jsonrpc": "2.0", "id": 1, "method": "ping" }]), Value::Null),
        (json!("ping"), Value::Null),
    ];

    for (body, expected_id) in cases {
        let (status, bytes) = post_rpc(&app, body.to_string()).await;
        assert_eq!(status, StatusCode::OK);

        let response: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(response["error"]["code"], -32600, "body {body}");
        assert_eq!(response.get("id"), Some(&expected_id), "body {body}");
    }
}

#[tokio::test]
async fn null_id_is_a_request_not_a_notification() {
    let app = test_router();
    let body = json!({ "jsonrpc": "2.0", "id": null, "method": "ping" });

    let (status, bytes) = post_rpc(&app, body.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let response: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(response.get("id"), Some(&Value::Null));
    assert_eq!(response["result"], json!({}));
}

#[tokio::test]
async fn tool_call_over_http_carries_structured_content() {
    let app = test_router();
    let body = json!({
        "jsonrpc": "2.0",
        "id": 9,
        "method": "tools/call",
        "params": { "name": "search", "arguments": { "query": "vanilla" } }
    });

    let (_, bytes) = post_rpc(&app, body.to_string()).await;
    let response: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(response["result"]["structuredContent"], json!({ "ids": ["2"] }));
}

#[tokio::test]
async fn wrong_jsonrpc_version_is_invalid_request() {
    let app = test_router();
    let body = json!({ "jsonrpc": "1.0", "id": 5, "method": "ping" });

    let (_, bytes) = post_rpc(&app, body.to_string()).await;
    let response: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(response["error"]["code"], -32600);
    assert_eq!(response["id"], 5);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let app = test_router();
    let padding = "x".repeat(2 * 1024 * 1024);
    let body = format!(r#"{{"jsonrpc":"2.0","id":1,"method":"ping","pad":"{padding}"}}"#);

    let (status, _) = post_rpc(&app, body).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let app = test_router();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/openapi.json")
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
