use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use agentuse_core::ids::MonotonicIdSource;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;

use crate::error::McpError;
use crate::protocol::{encode_request, McpRequest, McpResponse};

/// Declarative description of one MCP server to spawn, matching the
/// `mcpServers` map an agent file's front-matter supplies.
#[derive(Debug, Clone)]
pub struct McpServerSpec {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// A running MCP server child process and its stdio transport. Owned
/// exclusively by whichever trial started it; `Drop` is a best-effort
/// safety net, not the primary shutdown path — callers should invoke
/// [`McpServerHandle::shutdown`] on every exit from the trial so the
/// process is given a chance to exit cleanly before being killed.
#[derive(Debug)]
pub struct McpServerHandle {
    name: String,
    child: Option<Child>,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    next_id: AtomicU64,
}

impl McpServerHandle {
    pub async fn spawn(spec: &McpServerSpec, working_dir: &std::path::Path) -> Result<Self, McpError> {
        let mut command = Command::new(&spec.command);
        command
            .args(&spec.args)
            .current_dir(working_dir)
            .envs(spec.env.iter().cloned())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|source| McpError::Spawn {
            name: spec.name.clone(),
            source,
        })?;

        let stdin = child.stdin.take().ok_or_else(|| McpError::Spawn {
            name: spec.name.clone(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "child stdin was not piped"),
        })?;
        let stdout = child.stdout.take().ok_or_else(|| McpError::Spawn {
            name: spec.name.clone(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "child stdout was not piped"),
        })?;

        Ok(Self {
            name: spec.name.clone(),
            child: Some(child),
            stdin,
            stdout: BufReader::new(stdout),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sends `method`/`params` and waits for the matching response,
    /// folding an `error` payload into `Err`.
    pub async fn call(&mut self, method: &str, params: Value) -> Result<Value, McpError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = McpRequest {
            id,
            method: method.to_string(),
            params,
        };

        self.stdin
            .write_all(encode_request(&request).as_bytes())
            .await
            .map_err(|source| McpError::Io {
                name: self.name.clone(),
                source,
            })?;
        self.stdin.flush().await.map_err(|source| McpError::Io {
            name: self.name.clone(),
            source,
        })?;

        let mut line = String::new();
        let bytes_read = self
            .stdout
            .read_line(&mut line)
            .await
            .map_err(|source| McpError::Io {
                name: self.name.clone(),
                source,
            })?;
        if bytes_read == 0 {
            return Err(McpError::ClosedConnection {
                name: self.name.clone(),
                request_id: id,
            });
        }

        let response: McpResponse =
            serde_json::from_str(line.trim()).map_err(|source| McpError::MalformedResponse {
                name: self.name.clone(),
                source,
            })?;
        response
            .into_result()
            .map_err(|error| McpError::RemoteError {
                name: self.name.clone(),
                request_id: id,
                code: error.code,
                message: error.message,
            })
    }

    /// Closes stdin (many servers treat EOF as a shutdown request) and
    /// waits up to [`SHUTDOWN_GRACE`] for the process to exit; kills it
    /// outright if it hasn't. Consumes the handle so it can't be reused.
    pub async fn shutdown(mut self) -> Result<(), McpError> {
        let _ = self.stdin.shutdown().await;
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        if timeout(SHUTDOWN_GRACE, child.wait()).await.is_err() {
            let _ = child.start_kill();
        }
        Ok(())
    }
}

impl Drop for McpServerHandle {
    fn drop(&mut self) {
        if let Some(child) = self.child.as_mut() {
            let _ = child.start_kill();
        }
    }
}

/// Spawns every MCP server declared by an agent, assigning each a fresh
/// id from `ids` for diagnostic correlation. Returns handles in
/// declaration order; on any failure, every handle spawned so far is
/// shut down before the error propagates.
pub async fn spawn_all(
    specs: &[McpServerSpec],
    working_dir: &std::path::Path,
    ids: &MonotonicIdSource,
) -> Result<Vec<McpServerHandle>, McpError> {
    let mut handles = Vec::with_capacity(specs.len());
    for spec in specs {
        let _correlation_id = ids.next_id("mcp");
        match McpServerHandle::spawn(spec, working_dir).await {
            Ok(handle) => handles.push(handle),
            Err(error) => {
                for handle in handles {
                    let _ = handle.shutdown().await;
                }
                return Err(error);
            }
        }
    }
    Ok(handles)
}
