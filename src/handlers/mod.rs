pub mod fetch;
pub mod search;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::discovery::{self, FETCH_TOOL, SEARCH_TOOL};
use crate::protocol::{
    FetchParams, InitializeParams, JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpErrorCode,
    McpErrorResponse, SearchParams, ToolCallParams, ToolResult,
};
use crate::query::QueryService;
use crate::schema;

/// MCP protocol revision advertised during `initialize`.
pub const PROTOCOL_VERSION: &str = "2025-06-18";

/// Dispatch a JSON-RPC request to the appropriate handler.
///
/// Returns `None` for notifications (no response required).
pub async fn dispatch(req: &JsonRpcRequest, service: &QueryService) -> Option<JsonRpcResponse> {
    let response = match req.method.as_str() {
        "initialize" => {
            if let Some(params) = req
                .params
                .as_ref()
                .and_then(|v| serde_json::from_value::<InitializeParams>(v.clone()).ok())
            {
                let client = params.client_info.as_ref();
                tracing::info!(
                    client_name = client.and_then(|c| c.name.as_deref()).unwrap_or("unknown"),
                    client_version = client.and_then(|c| c.version.as_deref()).unwrap_or("unknown"),
                    protocol_version = params.protocol_version.as_deref().unwrap_or("unspecified"),
                    "client initializing"
                );
            }

            let descriptor = discovery::describe();
            let result = serde_json::json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": descriptor.name,
                    "version": descriptor.version
                },
                "instructions": descriptor.instructions
            });
            JsonRpcResponse::success(req.id.clone(), result)
        }

        "notifications/initialized" => return None,

        "ping" => JsonRpcResponse::success(req.id.clone(), serde_json::json!({})),

        "tools/list" => {
            let tools: Vec<Value> = discovery::describe()
                .tools
                .iter()
                .map(|tool| {
                    serde_json::json!({
                        "name": tool.name,
                        "description": tool.description,
                        "inputSchema": tool.input_schema,
                        "outputSchema": tool.output_schema
                    })
                })
                .collect();
            JsonRpcResponse::success(req.id.clone(), serde_json::json!({ "tools": tools }))
        }

        "tools/call" => {
            let params: ToolCallParams = match &req.params {
                Some(v) => match serde_json::from_value(v.clone()) {
                    Ok(p) => p,
                    Err(e) => {
                        return reply(
                            req,
                            JsonRpcResponse::error(
                                req.id.clone(),
                                JsonRpcError::invalid_params(format!(
                                    "Invalid tools/call params: {e}"
                                )),
                            ),
                        );
                    }
                },
                None => {
                    return reply(
                        req,
                        JsonRpcResponse::error(
                            req.id.clone(),
                            JsonRpcError::invalid_params("Missing params for tools/call"),
                        ),
                    );
                }
            };

            match dispatch_tool_call(&params, service).await {
                Ok(tool_result) => match serde_json::to_value(&tool_result) {
                    Ok(result_json) => JsonRpcResponse::success(req.id.clone(), result_json),
                    Err(e) => JsonRpcResponse::error(
                        req.id.clone(),
                        JsonRpcError::internal_error(format!("Cannot encode tool result: {e}")),
                    ),
                },
                Err(err) => JsonRpcResponse::error(req.id.clone(), err),
            }
        }

        _ => JsonRpcResponse::error(req.id.clone(), JsonRpcError::method_not_found(&req.method)),
    };

    reply(req, response)
}

/// Drop the response when the request was a notification.
fn reply(req: &JsonRpcRequest, response: JsonRpcResponse) -> Option<JsonRpcResponse> {
    if req.is_notification() {
        None
    } else {
        Some(response)
    }
}

/// Route a `tools/call` to its tool.
///
/// An unknown tool name is a protocol error; everything past that point is
/// reported inside the tool result.
async fn dispatch_tool_call(
    params: &ToolCallParams,
    service: &QueryService,
) -> Result<ToolResult, JsonRpcError> {
    let tool = discovery::tool(&params.name).ok_or_else(|| {
        JsonRpcError::from(McpErrorResponse::new(
            McpErrorCode::UnknownTool,
            format!("Unknown tool: {}", params.name),
        ))
    })?;

    let arguments = params
        .arguments
        .clone()
        .unwrap_or_else(|| Value::Object(Default::default()));

    let Some(validator) = discovery::input_validator(&tool.name) else {
        return Ok(McpErrorResponse::canonical(McpErrorCode::InternalError).into());
    };
    if let Err(e) = schema::validate_with(validator, &arguments) {
        return Ok(invalid_arguments(&tool.name, e));
    }

    let result = match tool.name.as_str() {
        SEARCH_TOOL => match parse_arguments::<SearchParams>(arguments) {
            Ok(p) => search::handle(p, service).await,
            Err(e) => invalid_arguments(SEARCH_TOOL, e),
        },
        FETCH_TOOL => match parse_arguments::<FetchParams>(arguments) {
            Ok(p) => fetch::handle(p, service).await,
            Err(e) => invalid_arguments(FETCH_TOOL, e),
        },
        other => {
            tracing::error!(tool = other, "advertised tool has no handler");
            McpErrorResponse::canonical(McpErrorCode::InternalError).into()
        }
    };

    Ok(result)
}

fn parse_arguments<T: DeserializeOwned>(arguments: Value) -> Result<T, serde_json::Error> {
    serde_json::from_value(arguments)
}

fn invalid_arguments(tool: &str, err: impl std::fmt::Display) -> ToolResult {
    McpErrorResponse::new(
        McpErrorCode::InvalidArguments,
        format!("Invalid arguments for {tool}: {err}"),
    )
    .into()
}
