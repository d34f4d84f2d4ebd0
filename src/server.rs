use std::sync::Arc;

use serde_json::Value;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};

use crate::config::{ServerConfig, Transport};
use crate::error::ServerError;
use crate::handlers;
use crate::http;
use crate::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId};
use crate::query::QueryService;

/// Maximum bytes per JSON-RPC message (1 MiB).
pub const MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// Top-level server: owns the config and the shared query service, and
/// runs whichever transport the config selects.
pub struct McpServer {
    config: ServerConfig,
    service: Arc<QueryService>,
}

impl McpServer {
    pub fn new(config: ServerConfig, service: Arc<QueryService>) -> Self {
        Self { config, service }
    }

    pub async fn run(&self) -> Result<(), ServerError> {
        tracing::info!(records = self.service.store().len(), "query service ready");
        match self.config.transport {
            Transport::Http => http::serve(self.config.bind_addr, self.service.clone()).await,
            Transport::Stdio => {
                tracing::info!("serving MCP over stdio");
                let reader = BufReader::new(tokio::io::stdin());
                let writer = tokio::io::stdout();
                StdioSession::new(self.service.clone()).run(reader, writer).await
            }
        }
    }
}

/// Decode one raw JSON-RPC message.
///
/// `Ok(None)` means the message was blank and should be ignored; `Err`
/// carries the error response to send back. Bytes that are not JSON get
/// a parse error; JSON that is not a single request object (including a
/// batch array) gets invalid-request, echoing its `id` when readable.
pub fn decode_message(raw: &[u8]) -> Result<Option<JsonRpcRequest>, JsonRpcResponse> {
    if raw.len() > MAX_MESSAGE_BYTES {
        tracing::warn!(
            "Message too large: {} bytes (limit {MAX_MESSAGE_BYTES})",
            raw.len()
        );
        return Err(JsonRpcResponse::error(None, JsonRpcError::parse_error()));
    }

    let trimmed = match std::str::from_utf8(raw) {
        Ok(s) => s.trim(),
        Err(_) => return Err(JsonRpcResponse::error(None, JsonRpcError::parse_error())),
    };

    if trimmed.is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(trimmed).map_err(|e| {
        tracing::warn!("Parse error: {e}");
        JsonRpcResponse::error(None, JsonRpcError::parse_error())
    })?;

    let id = value
        .get("id")
        .and_then(|v| serde_json::from_value::<RpcId>(v.clone()).ok());

    let req: JsonRpcRequest = serde_json::from_value(value).map_err(|e| {
        tracing::warn!("Invalid request: {e}");
        JsonRpcResponse::error(id.clone(), JsonRpcError::invalid_request())
    })?;

    if req.jsonrpc != "2.0" {
        return Err(JsonRpcResponse::error(
            req.id.clone(),
            JsonRpcError::invalid_request(),
        ));
    }

    Ok(Some(req))
}

/// One MCP session over newline-delimited JSON-RPC 2.0.
///
/// Only `initialize` is accepted until the handshake completes.
pub struct StdioSession {
    service: Arc<QueryService>,
    initialized: bool,
}

impl StdioSession {
    pub fn new(service: Arc<QueryService>) -> Self {
        Self {
            service,
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Serve messages from `reader` until EOF, writing responses to `writer`.
    pub async fn run<R, W>(&mut self, mut reader: R, mut writer: W) -> Result<(), ServerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut raw = Vec::new();
        let line_limit = MAX_MESSAGE_BYTES as u64 + 1;

        loop {
            raw.clear();
            let n = (&mut reader).take(line_limit).read_until(b'\n', &mut raw).await?;
            if n == 0 {
                break;
            }

            let line = match raw.strip_suffix(b"\n") {
                Some(line) => line,
                None if raw.len() > MAX_MESSAGE_BYTES => {
                    tracing::warn!("Message exceeds {MAX_MESSAGE_BYTES} bytes, discarding line");
                    discard_line(&mut reader).await?;
                    write_response(
                        &mut writer,
                        &JsonRpcResponse::error(None, JsonRpcError::parse_error()),
                    )
                    .await?;
                    continue;
                }
                None => &raw[..],
            };

            let req = match decode_message(line) {
                Ok(Some(req)) => req,
                Ok(None) => continue,
                Err(resp) => {
                    write_response(&mut writer, &resp).await?;
                    continue;
                }
            };

            // Initialization gate: only `initialize` is allowed before handshake completes
            if !self.initialized && req.method != "initialize" {
                if req.is_notification() {
                    continue;
                }
                write_response(
                    &mut writer,
                    &JsonRpcResponse::error(
                        req.id.clone(),
                        JsonRpcError::invalid_request_with("Server not initialized"),
                    ),
                )
                .await?;
                continue;
            }

            if let Some(resp) = handlers::dispatch(&req, &self.service).await {
                write_response(&mut writer, &resp).await?;
            }

            if req.method == "initialize" {
                self.initialized = true;
            }
        }

        tracing::info!("stdin closed, ending session");
        Ok(())
    }
}

/// Skip the rest of the current line without buffering it.
async fn discard_line<R>(reader: &mut R) -> Result<(), ServerError>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let buf = reader.fill_buf().await?;
        if buf.is_empty() {
            return Ok(());
        }
        match buf.iter().position(|&b| b == b'\n') {
            Some(pos) => {
                reader.consume(pos + 1);
                return Ok(());
            }
            None => {
                let len = buf.len();
                reader.consume(len);
            }
        }
    }
}

async fn write_response<W>(writer: &mut W, resp: &JsonRpcResponse) -> Result<(), ServerError>
where
    W: AsyncWrite + Unpin,
{
    let out = serde_json::to_string(resp)?;
    writer.write_all(out.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
