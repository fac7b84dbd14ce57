//! The contract the Trial Runner needs from a model provider: chat
//! messages, tool definitions, and an [`LlmClient`] trait. Building an
//! actual provider wire client (authentication, request shaping, retry
//! policy) is the embedder's job — this crate only defines the
//! interface, and the `provider:modelName` parsing used to pick one.
mod provider;
mod types;

pub use provider::{ModelRef, ModelRefParseError, Provider};
pub use types::{
    ChatRequest, ChatResponse, ChatUsage, ContentBlock, LlmClient, LlmError, Message, MessageRole,
    ToolCall, ToolChoice, ToolDefinition,
};
