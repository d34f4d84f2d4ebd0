pub mod request;
pub mod response;

pub use request::{
    ClientInfo, FetchParams, InitializeParams, JsonRpcRequest, RpcId, SearchParams,
    ToolCallParams,
};
pub use response::{
    JsonRpcError, JsonRpcResponse, McpError, McpErrorCode, McpErrorResponse, ToolResult,
    ToolResultContent,
};
