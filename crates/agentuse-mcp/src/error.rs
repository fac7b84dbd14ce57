use thiserror::Error;

/// Every way an MCP server interaction can fail.
#[derive(Debug, Error)]
pub enum McpError {
    #[error("failed to spawn mcp server '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("mcp server '{name}' closed stdout before responding to request {request_id}")]
    ClosedConnection { name: String, request_id: u64 },

    #[error("mcp server '{name}' sent a malformed response: {source}")]
    MalformedResponse {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("mcp server '{name}' returned an error for request {request_id}: {message} (code {code})")]
    RemoteError {
        name: String,
        request_id: u64,
        code: i64,
        message: String,
    },

    #[error("i/o error talking to mcp server '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}
