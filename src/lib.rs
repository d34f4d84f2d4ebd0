//! Demo MCP server over a static set of cupcake-order records.
//!
//! Exposes `search` and `fetch` tools over JSON-RPC 2.0 (HTTP `POST /mcp`
//! or stdio) and publishes a discovery document at
//! `/.well-known/mcp.json` so agent clients can find the tools.

pub mod config;
pub mod discovery;
pub mod error;
pub mod handlers;
pub mod http;
pub mod logging;
pub mod protocol;
pub mod query;
pub mod server;
pub mod store;

pub mod schema;
