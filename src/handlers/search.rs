use crate::protocol::{SearchParams, ToolResult};
use crate::query::QueryService;

/// Handle a `search` tool call.
///
/// Never fails: any query string, including an empty one, produces an
/// `{"ids": [...]}` payload.
pub async fn handle(params: SearchParams, service: &QueryService) -> ToolResult {
    let results = service.search(&params.query);
    tracing::debug!(query = %params.query, matches = results.ids.len(), "search");
    ToolResult::json(&results)
}
