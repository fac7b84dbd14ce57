use std::fmt;

use serde::{Deserialize, Serialize};

/// `provider:modelName`. The provider prefix is opaque to the core but
/// used for display grouping in reports.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(pub String);

impl ModelId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The portion before the first `:`, or the whole id if there is none.
    pub fn provider(&self) -> &str {
        self.0.split(':').next().unwrap_or(self.0.as_str())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Placeholder agent `model` value substituted with the concrete
/// [`ModelId`] when each trial starts (the "static" substitution regime).
pub const MODEL_PLACEHOLDER: &str = "${model}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// `1|2|3` for `easy|medium|hard`, used when producing the weighted
    /// overall score.
    pub fn weight(self) -> u32 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteConfig {
    pub models: Vec<ModelId>,
    #[serde(default = "default_runs")]
    pub runs: u32,
}

fn default_runs() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suite {
    pub id: String,
    pub name: String,
    pub config: SuiteConfig,
    pub tests: Vec<Test>,
}

impl Suite {
    pub fn total_scenarios(&self) -> usize {
        self.tests.iter().map(|test| test.scenarios.len()).sum()
    }

    /// `totalScenarios x |models| x runs`, the invariant every loaded
    /// suite must satisfy per the suite descriptor's `config` block.
    pub fn total_trials(&self) -> u64 {
        self.total_scenarios() as u64
            * self.config.models.len() as u64
            * self.config.runs as u64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Test {
    /// Path to the agent definition, relative to the suite file's directory.
    pub agent: String,
    pub scenarios: Vec<Scenario>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    pub input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<ScenarioExpectation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioExpectation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<crate::validation::OutputValidation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<crate::validation::ArtifactExpectation>,
}

/// Subset of an agent definition's front-matter the benchmark core
/// requires. The full agent file (instructions body, skills, other
/// collaborator-only fields) is parsed by the agent file parser, an
/// external collaborator; the core only needs what follows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_steps: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mcp_servers: Vec<McpServerSpec>,
    pub instructions: String,
}

impl AgentConfig {
    pub fn uses_model_placeholder(&self) -> bool {
        self.model == MODEL_PLACEHOLDER
    }

    /// Returns a shallow copy with `${model}` replaced by `model`, per the
    /// static (load-time) substitution regime. Any other literal model
    /// value is left untouched.
    pub fn with_resolved_model(&self, model: &ModelId) -> Self {
        let resolved_model = if self.uses_model_placeholder() {
            model.as_str().to_string()
        } else {
            self.model.clone()
        };
        Self {
            model: resolved_model,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpServerSpec {
    pub name: String,
    pub command: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "std::collections::BTreeMap::is_empty")]
    pub env: std::collections::BTreeMap<String, String>,
}

/// A fully loaded agent: the parsed configuration plus the path it was
/// loaded from. Owned exclusively by the suite loader; the trial runner
/// receives a shallow copy via [`AgentConfig::with_resolved_model`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub source_path: String,
    pub config: AgentConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_id_provider_splits_on_first_colon() {
        let model = ModelId::new("anthropic:claude-sonnet");
        assert_eq!(model.provider(), "anthropic");
    }

    #[test]
    fn model_id_provider_falls_back_to_whole_string_without_colon() {
        let model = ModelId::new("local-model");
        assert_eq!(model.provider(), "local-model");
    }

    #[test]
    fn total_trials_multiplies_scenarios_models_and_runs() {
        let suite = Suite {
            id: "s1".to_string(),
            name: "Suite".to_string(),
            config: SuiteConfig {
                models: vec![ModelId::new("a:x"), ModelId::new("b:y")],
                runs: 3,
            },
            tests: vec![Test {
                agent: "agent.md".to_string(),
                scenarios: vec![
                    scenario("one"),
                    scenario("two"),
                ],
            }],
        };
        assert_eq!(suite.total_scenarios(), 2);
        assert_eq!(suite.total_trials(), 2 * 2 * 3);
    }

    #[test]
    fn with_resolved_model_substitutes_only_the_literal_placeholder() {
        let placeholder = AgentConfig {
            model: MODEL_PLACEHOLDER.to_string(),
            max_steps: None,
            mcp_servers: vec![],
            instructions: "do work".to_string(),
        };
        let resolved = placeholder.with_resolved_model(&ModelId::new("openai:gpt-5"));
        assert_eq!(resolved.model, "openai:gpt-5");

        let concrete = AgentConfig {
            model: "openai:gpt-5-mini".to_string(),
            ..placeholder
        };
        let unchanged = concrete.with_resolved_model(&ModelId::new("anthropic:claude"));
        assert_eq!(unchanged.model, "openai:gpt-5-mini");
    }

    fn scenario(id: &str) -> Scenario {
        Scenario {
            id: id.to_string(),
            name: id.to_string(),
            difficulty: None,
            input: "do it".to_string(),
            expected: None,
        }
    }
}
