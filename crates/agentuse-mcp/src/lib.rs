//! MCP child-process supervision: spawning the servers an agent
//! declares, a newline-delimited JSON-RPC-style stdio transport, and a
//! scoped handle whose lifecycle the Trial Runner owns for one trial.

pub mod error;
pub mod process;
pub mod protocol;

pub use error::McpError;
pub use process::{spawn_all, McpServerHandle, McpServerSpec};
pub use protocol::{McpRequest, McpResponse, McpResponseError};
