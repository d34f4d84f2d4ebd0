//! HTTP transport: the discovery document plus a JSON-RPC POST endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;

use crate::discovery::{self, ServiceDescriptor, WELL_KNOWN_PATH};
use crate::error::ServerError;
use crate::handlers;
use crate::protocol::{JsonRpcError, JsonRpcResponse};
use crate::query::QueryService;
use crate::server::{decode_message, MAX_MESSAGE_BYTES};

/// Path that accepts JSON-RPC messages.
pub const RPC_PATH: &str = "/mcp";

/// Build the router. Each POST carries one message; no session state is kept.
pub fn router(service: Arc<QueryService>) -> Router {
    Router::new()
        .route(WELL_KNOWN_PATH, get(well_known))
        .route(RPC_PATH, post(rpc))
        .layer(DefaultBodyLimit::max(MAX_MESSAGE_BYTES))
        .with_state(service)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, service: Arc<QueryService>) -> Result<(), ServerError> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        "HTTP server listening on {} (discovery at {WELL_KNOWN_PATH}, rpc at {RPC_PATH})",
        listener.local_addr()?
    );

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

async fn well_known() -> Json<&'static ServiceDescriptor> {
    Json(discovery::describe())
}

async fn rpc(State(service): State<Arc<QueryService>>, body: Bytes) -> Response {
    let req = match decode_message(&body) {
        Ok(Some(req)) => req,
        Ok(None) => {
            let resp = JsonRpcResponse::error(None, JsonRpcError::parse_error());
            return (StatusCode::OK, Json(resp)).into_response();
        }
        Err(resp) => return (StatusCode::OK, Json(resp)).into_response(),
    };

    match handlers::dispatch(&req, &service).await {
        Some(resp) => (StatusCode::OK, Json(resp)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
