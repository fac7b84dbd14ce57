use thiserror::Error;

/// Which wire protocol a model id's provider prefix selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
    Google,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelRefParseError {
    #[error("model id '{0}' is missing a provider prefix (expected provider:modelName)")]
    MissingProvider(String),
    #[error("model id '{0}' has an unrecognized provider '{1}'")]
    UnknownProvider(String, String),
}

/// A parsed `provider:modelName` model identifier, used to pick which
/// [`crate::LlmClient`] implementation a trial dispatches to. The wire
/// form (unparsed, opaque) is `agentuse_model::ModelId`; this type exists
/// only where the provider must actually be resolved to a concrete client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef {
    pub provider: Provider,
    pub model_name: String,
}

impl ModelRef {
    pub fn parse(raw: &str) -> Result<Self, ModelRefParseError> {
        let Some((prefix, model_name)) = raw.split_once(':') else {
            return Err(ModelRefParseError::MissingProvider(raw.to_string()));
        };
        let provider = match prefix {
            "openai" => Provider::OpenAi,
            "anthropic" => Provider::Anthropic,
            "google" => Provider::Google,
            other => {
                return Err(ModelRefParseError::UnknownProvider(
                    raw.to_string(),
                    other.to_string(),
                ))
            }
        };
        if model_name.is_empty() {
            return Err(ModelRefParseError::MissingProvider(raw.to_string()));
        }
        Ok(Self {
            provider,
            model_name: model_name.to_string(),
        })
    }
}
