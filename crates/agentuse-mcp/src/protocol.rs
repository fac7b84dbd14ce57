use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A request frame sent to an MCP server over stdio, one JSON object per
/// line. `id` is assigned by the caller and echoed back on the response.
#[derive(Debug, Clone, Serialize)]
pub struct McpRequest {
    pub id: u64,
    pub method: String,
    pub params: Value,
}

/// A response frame read back from an MCP server. Exactly one of
/// `result`/`error` is present on the wire; both are modeled as optional
/// here and reconciled by [`McpResponse::into_result`].
#[derive(Debug, Clone, Deserialize)]
pub struct McpResponse {
    pub id: u64,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<McpResponseError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct McpResponseError {
    pub code: i64,
    pub message: String,
}

impl McpResponse {
    /// Folds the result/error pair into a single `Result`, treating a
    /// response with neither as an empty success (some tools return no
    /// payload).
    pub fn into_result(self) -> Result<Value, McpResponseError> {
        match (self.result, self.error) {
            (_, Some(error)) => Err(error),
            (Some(result), None) => Ok(result),
            (None, None) => Ok(Value::Null),
        }
    }
}

pub fn encode_request(request: &McpRequest) -> String {
    let mut line = serde_json::to_string(request).expect("mcp request is always serializable");
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_request_produces_a_single_newline_terminated_json_line() {
        let request = McpRequest {
            id: 1,
            method: "tools/call".to_string(),
            params: serde_json::json!({"name": "read_file"}),
        };
        let line = encode_request(&request);
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);
    }

    #[test]
    fn into_result_prefers_error_when_both_are_present() {
        let response = McpResponse {
            id: 1,
            result: Some(Value::Bool(true)),
            error: Some(McpResponseError {
                code: -32000,
                message: "boom".to_string(),
            }),
        };
        assert!(response.into_result().is_err());
    }

    #[test]
    fn into_result_defaults_to_null_when_neither_is_present() {
        let response = McpResponse {
            id: 1,
            result: None,
            error: None,
        };
        assert_eq!(response.into_result().unwrap(), Value::Null);
    }
}
