use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use cupcake_mcp_server::discovery;
use cupcake_mcp_server::handlers;
use cupcake_mcp_server::protocol::{JsonRpcRequest, RpcId};
use cupcake_mcp_server::query::QueryService;
use cupcake_mcp_server::store::RecordStore;
use serde_json::{json, Value};

fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/golden/fixtures")
}

fn expected_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/golden/expected")
        .join(name)
}

fn read_expected(name: &str) -> String {
    fs::read_to_string(expected_path(name))
        .expect("expected file missing")
        .trim_end()
        .to_string()
}

fn read_expected_json(name: &str) -> Value {
    serde_json::from_str(&read_expected(name)).expect("expected file is not JSON")
}

fn fixture_service() -> QueryService {
    let store = RecordStore::load(&fixtures_root().join("records.json")).unwrap();
    QueryService::new(Arc::new(store))
}

fn tool_call(name: &str, arguments: Value) -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: "2.0".into(),
        id: Some(RpcId::Number(1)),
        method: "tools/call".into(),
        params: Some(json!({ "name": name, "arguments": arguments })),
    }
}

async fn tool_text(service: &QueryService, name: &str, arguments: Value) -> String {
    let resp = handlers::dispatch(&tool_call(name, arguments), service)
        .await
        .expect("missing response");
    let result = resp.result.expect("missing result");
    result["content"][0]["text"]
        .as_str()
        .expect("missing text content")
        .to_string()
}

#[test]
fn golden_discovery_document() {
    let actual = serde_json::to_value(discovery::describe()).unwrap();
    let expected = read_expected_json("discovery.json");
    assert_eq!(actual, expected, "discovery document does not match golden");
}

#[tokio::test]
async fn golden_search_output() {
    let service = fixture_service();

    let cake = tool_text(&service, "search", json!({ "query": "cake" })).await;
    assert_eq!(cake, read_expected("search_cake.json"), "search output does not match golden");

    let mixed = tool_text(&service, "search", json!({ "query": "ADA lemon" })).await;
    assert_eq!(mixed, read_expected("search_ada_lemon.json"), "search output does not match golden");
}

#[tokio::test]
async fn golden_fetch_output() {
    let service = fixture_service();

    let text = tool_text(&service, "fetch", json!({ "id": "1" })).await;
    assert_eq!(text, read_expected("fetch_record.json"), "fetch output does not match golden");
}

#[tokio::test]
async fn golden_mcp_error_not_found() {
    let service = fixture_service();

    let resp = handlers::dispatch(&tool_call("fetch", json!({ "id": "404" })), &service)
        .await
        .expect("missing response");
    let actual = serde_json::to_value(&resp).unwrap();

    assert_eq!(
        actual,
        read_expected_json("error_not_found.json"),
        "not_found error response does not match golden"
    );
}

#[tokio::test]
async fn golden_mcp_error_unknown_tool() {
    let service = fixture_service();

    let resp = handlers::dispatch(&tool_call("search_everything", json!({})), &service)
        .await
        .expect("missing response");
    let actual = serde_json::to_value(&resp).unwrap();

    assert_eq!(
        actual,
        read_expected_json("error_unknown_tool.json"),
        "unknown_tool error response does not match golden"
    );
}

#[tokio::test]
async fn golden_end_to_end_determinism() {
    let service_a = fixture_service();
    let service_b = fixture_service();

    for (name, arguments) in [
        ("search", json!({ "query": "cake" })),
        ("search", json!({ "query": "" })),
        ("fetch", json!({ "id": "3" })),
        ("fetch", json!({ "id": "missing" })),
    ] {
        let req = tool_call(name, arguments);
        let resp_a = handlers::dispatch(&req, &service_a).await.expect("missing response");
        let resp_b = handlers::dispatch(&req, &service_b).await.expect("missing response");

        assert_eq!(
            serde_json::to_string(&resp_a).unwrap(),
            serde_json::to_string(&resp_b).unwrap(),
            "end-to-end pipeline is not deterministic for {name}"
        );
    }
}
