use std::path::PathBuf;

/// The record source could not be turned into a [`RecordStore`](crate::store::RecordStore).
///
/// Always fatal: the server never starts with a partial record set.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read record source {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("record source {} is not a valid record array: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("record at position {index} has an empty id")]
    EmptyId { index: usize },
    #[error("duplicate record id {id:?} at position {duplicate} (first seen at {first})")]
    DuplicateId {
        id: String,
        first: usize,
        duplicate: usize,
    },
}

/// `fetch` was called with an id that is not in the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown id")]
pub struct NotFoundError {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("PORT must be an integer between 0 and 65535, got {0:?}")]
    InvalidPort(String),
    #[error("HOST is neither an IP address nor a resolvable hostname: {0:?}")]
    InvalidBindAddress(String),
    #[error("MCP_TRANSPORT must be \"http\" or \"stdio\", got {0:?}")]
    InvalidTransport(String),
}

/// Failure of a transport loop.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
}
