use serde::{Deserialize, Serialize};

/// JSON-RPC 2.0 ID, either a number, a string or an explicit `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(i64),
    Str(String),
    Null,
}

/// JSON-RPC 2.0 request envelope.
///
/// `id` is `None` only when the member is absent (a notification);
/// `"id": null` is kept as [`RpcId::Null`] and still gets a response.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default, deserialize_with = "deserialize_present_id")]
    pub id: Option<RpcId>,
    pub method: String,
    pub params: Option<serde_json::Value>,
}

fn deserialize_present_id<'de, D>(deserializer: D) -> Result<Option<RpcId>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    RpcId::deserialize(deserializer).map(Some)
}

impl JsonRpcRequest {
    /// A request without an id expects no response.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Arguments for the `search` tool.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    pub query: String,
}

/// Arguments for the `fetch` tool.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchParams {
    pub id: String,
}

/// MCP `initialize` params.
#[derive(Debug, Clone, Deserialize)]
pub struct InitializeParams {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: Option<String>,
    #[serde(rename = "clientInfo")]
    pub client_info: Option<ClientInfo>,
}

/// Client information sent during `initialize`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientInfo {
    pub name: Option<String>,
    pub version: Option<String>,
}

/// Parameters for `tools/call`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    pub arguments: Option<serde_json::Value>,
}
