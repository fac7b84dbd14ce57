use thiserror::Error;

/// Every way loading a suite can fail before any trial executes.
#[derive(Debug, Error)]
pub enum SuiteLoadError {
    #[error("suite '{requested}' not found; probed {}", .candidates.join(", "))]
    NotFound {
        requested: String,
        candidates: Vec<String>,
    },

    #[error("suite schema violation at '{field}': {issue}")]
    SchemaViolation { field: String, issue: String },

    #[error("failed to load agent '{agent_path}': {source}")]
    AgentLoadError {
        agent_path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("malformed model id '{raw}', expected provider:modelName")]
    InvalidModelId { raw: String },
}
