use std::path::PathBuf;

use agentuse_model::ModelId;

use crate::args::BenchArgs;

/// The run-level settings after applying the configuration precedence: a
/// CLI flag, when present at all, overrides the suite's own declaration.
#[derive(Debug, Clone)]
pub struct RunConfiguration {
    pub output_dir: PathBuf,
    pub models_override: Option<Vec<ModelId>>,
    pub runs_override: Option<u32>,
    pub timeout_secs: u64,
    pub max_steps_override: Option<u32>,
    pub budget_usd: Option<f64>,
    pub project_suites_dir: PathBuf,
    pub builtin_examples_dir: PathBuf,
}

impl RunConfiguration {
    pub fn from_args(args: &BenchArgs) -> Self {
        let models_override = if args.model.is_empty() {
            None
        } else {
            Some(args.model.iter().cloned().map(ModelId::new).collect())
        };

        Self {
            output_dir: args.output_dir.clone(),
            models_override,
            runs_override: args.runs,
            timeout_secs: args.timeout,
            max_steps_override: args.max_steps,
            budget_usd: args.budget_usd,
            project_suites_dir: args.project_suites_dir.clone(),
            builtin_examples_dir: args.builtin_examples_dir.clone(),
        }
    }

    pub fn project_suites_dir(&self) -> &std::path::Path {
        &self.project_suites_dir
    }

    pub fn builtin_examples_dir(&self) -> &std::path::Path {
        &self.builtin_examples_dir
    }

    /// The models a run actually dispatches to: the CLI's `--model` list
    /// when given at all, else the suite's own `config.models`.
    pub fn resolve_models(&self, suite_models: &[ModelId]) -> Vec<ModelId> {
        self.models_override
            .clone()
            .unwrap_or_else(|| suite_models.to_vec())
    }

    /// Trials per scenario per model: the CLI's `--runs` when given, else
    /// the suite's own `config.runs`.
    pub fn resolve_runs(&self, suite_runs: u32) -> u32 {
        self.runs_override.unwrap_or(suite_runs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(model: Vec<&str>, runs: Option<u32>) -> BenchArgs {
        BenchArgs {
            suite: "s".to_string(),
            output_dir: PathBuf::from("out"),
            model: model.into_iter().map(str::to_string).collect(),
            runs,
            timeout: 300,
            max_steps: None,
            budget_usd: None,
            project_suites_dir: PathBuf::from("suites"),
            builtin_examples_dir: PathBuf::from("examples/suites"),
            verbose: 0,
        }
    }

    #[test]
    fn an_empty_cli_model_list_falls_back_to_the_suites_models() {
        let config = RunConfiguration::from_args(&args(vec![], None));
        let suite_models = vec![ModelId::new("openai:gpt-4o")];
        assert_eq!(config.resolve_models(&suite_models), suite_models);
    }

    #[test]
    fn a_nonempty_cli_model_list_replaces_the_suites_models_entirely() {
        let config = RunConfiguration::from_args(&args(vec!["anthropic:claude-3-5-sonnet"], None));
        let suite_models = vec![ModelId::new("openai:gpt-4o"), ModelId::new("google:gemini-1.5-pro")];
        assert_eq!(
            config.resolve_models(&suite_models),
            vec![ModelId::new("anthropic:claude-3-5-sonnet")]
        );
    }

    #[test]
    fn runs_override_wins_when_present() {
        let config = RunConfiguration::from_args(&args(vec![], Some(7)));
        assert_eq!(config.resolve_runs(3), 7);
    }

    #[test]
    fn suite_runs_is_used_without_an_override() {
        let config = RunConfiguration::from_args(&args(vec![], None));
        assert_eq!(config.resolve_runs(3), 3);
    }
}
