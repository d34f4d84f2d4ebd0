use std::fmt;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::path::PathBuf;

use crate::error::ConfigError;

/// Default record source, relative to the working directory.
const DEFAULT_RECORDS_PATH: &str = "records.json";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;

/// Which transport the server speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// `POST /mcp` plus the well-known discovery route.
    Http,
    /// Newline-delimited JSON-RPC over stdin/stdout.
    Stdio,
}

/// Placeholder credentials for a future CRM integration.
///
/// Read from the environment so deployments can set them ahead of time;
/// no tool uses them.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CrmCredentials {
    pub bearer_token: Option<String>,
    pub system_id: Option<String>,
    pub subsystem_id: Option<String>,
}

impl fmt::Debug for CrmCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrmCredentials")
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .field("system_id", &self.system_id)
            .field("subsystem_id", &self.subsystem_id)
            .finish()
    }
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub records_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub transport: Transport,
    pub crm: CrmCredentials,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// - `RECORDS_PATH` (optional, default `records.json`): JSON array of records
    /// - `HOST` (optional, default `0.0.0.0`) and `PORT` (optional, default 8000)
    /// - `MCP_TRANSPORT` (optional, `http` or `stdio`, default `http`)
    /// - `CRM_API_TOKEN`, `CRM_SYSTEM_ID`, `CRM_SUBSYSTEM_ID` (optional, unused)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let records_path = lookup("RECORDS_PATH")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RECORDS_PATH));

        let host = lookup("HOST")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(val) => val
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(val))?,
            None => DEFAULT_PORT,
        };

        let bind_addr = resolve_bind_addr(&host, port)?;

        let transport = match lookup("MCP_TRANSPORT").as_deref() {
            None | Some("") => Transport::Http,
            Some(val) => match val.to_ascii_lowercase().as_str() {
                "http" => Transport::Http,
                "stdio" => Transport::Stdio,
                _ => return Err(ConfigError::InvalidTransport(val.to_string())),
            },
        };

        let crm = CrmCredentials {
            bearer_token: lookup("CRM_API_TOKEN"),
            system_id: lookup("CRM_SYSTEM_ID"),
            subsystem_id: lookup("CRM_SUBSYSTEM_ID"),
        };

        Ok(Self {
            records_path,
            bind_addr,
            transport,
            crm,
        })
    }
}

/// Turn `HOST` and `PORT` into a socket address.
///
/// IP literals (v4, v6, or bracketed v6) are used as-is; anything else is
/// resolved as a hostname and the first address wins.
fn resolve_bind_addr(host: &str, port: u16) -> Result<SocketAddr, ConfigError> {
    let literal = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    if let Ok(ip) = literal.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }

    (host, port)
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or_else(|| ConfigError::InvalidBindAddress(host.to_string()))
}
