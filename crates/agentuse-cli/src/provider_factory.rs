use std::time::Duration;

use agentuse_llm::{LlmClient, LlmError, ModelRef, ModelRefParseError, Provider};
use agentuse_model::ModelId;
use thiserror::Error;

use crate::http_client::{HttpClientConfig, HttpLlmClient};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_MAX_RETRIES: usize = 3;

#[derive(Debug, Error)]
pub enum ProviderFactoryError {
    #[error("invalid model id: {0}")]
    InvalidModelId(#[from] ModelRefParseError),
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("failed to build client for '{model}': {source}")]
    ClientBuild { model: String, source: LlmError },
}

struct ProviderDefaults {
    api_base: &'static str,
    api_key_env: &'static str,
    api_base_env: &'static str,
}

fn provider_defaults(provider: Provider) -> ProviderDefaults {
    match provider {
        Provider::OpenAi => ProviderDefaults {
            api_base: "https://api.openai.com/v1",
            api_key_env: "OPENAI_API_KEY",
            api_base_env: "OPENAI_API_BASE",
        },
        Provider::Anthropic => ProviderDefaults {
            api_base: "https://api.anthropic.com/v1",
            api_key_env: "ANTHROPIC_API_KEY",
            api_base_env: "ANTHROPIC_API_BASE",
        },
        Provider::Google => ProviderDefaults {
            api_base: "https://generativelanguage.googleapis.com/v1beta/openai",
            api_key_env: "GOOGLE_API_KEY",
            api_base_env: "GOOGLE_API_BASE",
        },
    }
}

/// Builds a concrete [`LlmClient`] for a `provider:modelName` model id.
/// Every provider is reached through the same OpenAI-compatible
/// chat-completions client; the provider prefix only selects which base
/// URL and credential the request is sent with. `<PROVIDER>_API_BASE`
/// overrides the default base, for gateways and self-hosted endpoints.
pub fn build_client(model: &ModelId) -> Result<Box<dyn LlmClient>, ProviderFactoryError> {
    let model_ref = ModelRef::parse(model.as_str())?;
    let defaults = provider_defaults(model_ref.provider);

    let api_base = std::env::var(defaults.api_base_env).unwrap_or_else(|_| defaults.api_base.to_string());
    let api_key = env_var(defaults.api_key_env)?;

    let client = HttpLlmClient::new(HttpClientConfig {
        api_base,
        api_key,
        request_timeout: DEFAULT_REQUEST_TIMEOUT,
        max_retries: DEFAULT_MAX_RETRIES,
    })
    .map_err(|source| ProviderFactoryError::ClientBuild {
        model: model.as_str().to_string(),
        source,
    })?;
    Ok(Box::new(client))
}

fn env_var(name: &str) -> Result<String, ProviderFactoryError> {
    std::env::var(name).map_err(|_| ProviderFactoryError::MissingEnvVar(name.to_string()))
}
