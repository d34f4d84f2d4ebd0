use crate::protocol::{FetchParams, McpErrorCode, McpErrorResponse, ToolResult};
use crate::query::QueryService;

/// Handle a `fetch` tool call.
///
/// An unknown id yields a tool result with `isError: true` and code
/// `not_found`; the JSON-RPC call itself still succeeds.
pub async fn handle(params: FetchParams, service: &QueryService) -> ToolResult {
    match service.fetch(&params.id) {
        Ok(record) => ToolResult::json(record),
        Err(err) => {
            tracing::info!(id = %err.id, "fetch for unknown id");
            McpErrorResponse::new(McpErrorCode::NotFound, err.to_string()).into()
        }
    }
}
