//! The one concrete [`LlmClient`] the binary ships with: a generic
//! chat-completions client speaking the OpenAI-compatible wire format
//! that OpenAI itself, most OpenAI-compatible gateways, and Anthropic's
//! and Google's OpenAI-compatibility endpoints all accept. Building a
//! native, provider-specific SDK is out of scope for this crate — an
//! embedder that needs one swaps this client out behind [`LlmClient`].
use std::time::Duration;

use agentuse_llm::{
    ChatRequest, ChatResponse, ChatUsage, ContentBlock, LlmClient, LlmError, Message, MessageRole,
    ToolCall, ToolChoice, ToolDefinition,
};
use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{json, Value};

const BASE_BACKOFF_MS: u64 = 200;

fn should_retry_status(status: u16) -> bool {
    status == 408 || status == 409 || status == 429 || status >= 500
}

fn backoff_with_jitter(attempt: usize) -> Duration {
    let deterministic = BASE_BACKOFF_MS.saturating_mul(1_u64 << attempt.min(6));
    let jittered = rand::thread_rng().gen_range(deterministic / 2..=deterministic);
    Duration::from_millis(jittered)
}

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub api_base: String,
    pub api_key: String,
    pub request_timeout: Duration,
    pub max_retries: usize,
}

/// A single chat-completions endpoint reachable with a bearer token.
#[derive(Debug, Clone)]
pub struct HttpLlmClient {
    http: reqwest::Client,
    api_base: String,
    max_retries: usize,
}

impl HttpLlmClient {
    pub fn new(config: HttpClientConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let bearer = format!("Bearer {}", config.api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&bearer)
                .map_err(|e| LlmError::InvalidResponse(format!("invalid API key: {e}")))?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
        })
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }

    async fn send_once(&self, body: &Value) -> Result<ChatResponse, LlmError> {
        let response = self
            .http
            .post(self.chat_completions_url())
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(LlmError::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: Value = serde_json::from_str(&text)?;
        parse_chat_completion(&parsed)
    }

    async fn complete_with_retry(&self, body: Value) -> Result<ChatResponse, LlmError> {
        let mut attempt = 0;
        loop {
            match self.send_once(&body).await {
                Ok(response) => return Ok(response),
                Err(LlmError::HttpStatus { status, body: err_body })
                    if should_retry_status(status) && attempt < self.max_retries =>
                {
                    tokio::time::sleep(backoff_with_jitter(attempt)).await;
                    attempt += 1;
                    let _ = err_body;
                }
                Err(other) => return Err(other),
            }
        }
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        let body = encode_chat_request(&request);
        self.complete_with_retry(body).await
    }
}

fn strip_provider_prefix(model: &str) -> &str {
    model.split_once(':').map_or(model, |(_, name)| name)
}

fn encode_chat_request(request: &ChatRequest) -> Value {
    let messages = request.messages.iter().map(encode_message).collect::<Vec<_>>();
    let mut body = json!({
        "model": strip_provider_prefix(&request.model),
        "messages": messages,
    });

    let object = body.as_object_mut().expect("object literal");
    if !request.tools.is_empty() {
        object.insert("tools".to_string(), json!(request.tools.iter().map(encode_tool).collect::<Vec<_>>()));
    }
    if let Some(choice) = &request.tool_choice {
        object.insert("tool_choice".to_string(), encode_tool_choice(choice));
    }
    if request.json_mode {
        object.insert("response_format".to_string(), json!({ "type": "json_object" }));
    }
    if let Some(max_tokens) = request.max_tokens {
        object.insert("max_tokens".to_string(), json!(max_tokens));
    }
    if let Some(temperature) = request.temperature {
        object.insert("temperature".to_string(), json!(temperature));
    }

    body
}

fn encode_tool(tool: &ToolDefinition) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters,
        }
    })
}

fn encode_tool_choice(choice: &ToolChoice) -> Value {
    match choice {
        ToolChoice::Auto => json!("auto"),
        ToolChoice::None => json!("none"),
        ToolChoice::Required => json!("required"),
        ToolChoice::Tool { name } => json!({ "type": "function", "function": { "name": name } }),
    }
}

fn encode_message(message: &Message) -> Value {
    let role = match message.role {
        MessageRole::System => "system",
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
        MessageRole::Tool => "tool",
    };

    if message.role == MessageRole::Tool {
        return json!({
            "role": role,
            "tool_call_id": message.tool_call_id,
            "content": message.text_content(),
        });
    }

    let tool_calls = message.tool_calls();
    if !tool_calls.is_empty() {
        return json!({
            "role": role,
            "content": Value::Null,
            "tool_calls": tool_calls.iter().map(encode_tool_call).collect::<Vec<_>>(),
        });
    }

    json!({ "role": role, "content": message.text_content() })
}

fn encode_tool_call(call: &ToolCall) -> Value {
    json!({
        "id": call.id,
        "type": "function",
        "function": {
            "name": call.name,
            "arguments": call.arguments.to_string(),
        }
    })
}

fn parse_chat_completion(body: &Value) -> Result<ChatResponse, LlmError> {
    let choice = body["choices"]
        .get(0)
        .ok_or_else(|| LlmError::InvalidResponse("response has no choices".to_string()))?;
    let message_json = &choice["message"];
    let finish_reason = choice["finish_reason"].as_str().map(str::to_string);

    let mut content = Vec::new();
    if let Some(text) = message_json["content"].as_str() {
        if !text.is_empty() {
            content.push(ContentBlock::text(text));
        }
    }
    if let Some(tool_calls) = message_json["tool_calls"].as_array() {
        for tool_call in tool_calls {
            let id = tool_call["id"].as_str().unwrap_or_default().to_string();
            let name = tool_call["function"]["name"].as_str().unwrap_or_default().to_string();
            let arguments_raw = tool_call["function"]["arguments"].as_str().unwrap_or("{}");
            let arguments: Value = serde_json::from_str(arguments_raw)
                .unwrap_or_else(|_| json!({ "raw": arguments_raw }));
            content.push(ContentBlock::tool_call(ToolCall { id, name, arguments }));
        }
    }

    let usage = &body["usage"];
    let chat_usage = ChatUsage {
        input_tokens: usage["prompt_tokens"].as_u64().unwrap_or_default(),
        output_tokens: usage["completion_tokens"].as_u64().unwrap_or_default(),
        total_tokens: usage["total_tokens"].as_u64().unwrap_or_default(),
        cached_input_tokens: usage["prompt_tokens_details"]["cached_tokens"]
            .as_u64()
            .unwrap_or_default(),
    };

    Ok(ChatResponse {
        message: Message::assistant_blocks(content),
        finish_reason,
        usage: chat_usage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_the_provider_prefix_before_sending_the_model_name() {
        assert_eq!(strip_provider_prefix("openai:gpt-4o"), "gpt-4o");
        assert_eq!(strip_provider_prefix("already-bare"), "already-bare");
    }

    #[test]
    fn encodes_a_tool_result_message_with_its_call_id() {
        let message = Message::tool_result("call_1", "read", "file contents", false);
        let encoded = encode_message(&message);
        assert_eq!(encoded["role"], "tool");
        assert_eq!(encoded["tool_call_id"], "call_1");
        assert_eq!(encoded["content"], "file contents");
    }

    #[test]
    fn parses_a_tool_call_choice_into_a_content_block() {
        let body = json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "function": { "name": "read", "arguments": "{\"path\":\"README.md\"}" }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
        });

        let response = parse_chat_completion(&body).unwrap();
        let calls = response.message.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "read");
        assert_eq!(response.usage.total_tokens, 15);
    }

    #[test]
    fn retryable_statuses_match_common_throttling_and_server_errors() {
        assert!(should_retry_status(429));
        assert!(should_retry_status(503));
        assert!(!should_retry_status(400));
        assert!(!should_retry_status(404));
    }
}
