use std::path::PathBuf;

use clap::{Parser, Subcommand};

fn parse_positive_u32(value: &str) -> Result<u32, String> {
    let parsed = value
        .parse::<u32>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_positive_f64(value: &str) -> Result<f64, String> {
    let parsed = value
        .parse::<f64>()
        .map_err(|error| format!("failed to parse float: {error}"))?;
    if !parsed.is_finite() || parsed <= 0.0 {
        return Err("value must be a finite number greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Parser)]
#[command(name = "agentuse", about = "Benchmark orchestration runtime for autonomous LLM agents", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Runs a benchmark suite to completion and writes its report artifacts.
    Bench(BenchArgs),
}

#[derive(Debug, Parser)]
pub struct BenchArgs {
    /// Suite path, or a bare name resolved under the project suites / built-in examples directories.
    pub suite: String,

    #[arg(
        long = "output-dir",
        env = "AGENTUSE_OUTPUT_DIR",
        default_value = "benchmark-results",
        help = "Directory the run's scratch directories and report artifacts are written under"
    )]
    pub output_dir: PathBuf,

    #[arg(
        long = "model",
        env = "AGENTUSE_MODELS",
        value_delimiter = ',',
        help = "Model ids (provider:modelName) to run; repeatable. Overrides the suite's model list entirely when present at all."
    )]
    pub model: Vec<String>,

    #[arg(long, env = "AGENTUSE_RUNS", value_parser = parse_positive_u32, help = "Trials per scenario per model; overrides the suite's config.runs")]
    pub runs: Option<u32>,

    #[arg(
        long,
        env = "AGENTUSE_TIMEOUT_SECS",
        default_value_t = 300,
        help = "Per-trial deadline in seconds"
    )]
    pub timeout: u64,

    #[arg(long = "max-steps", env = "AGENTUSE_MAX_STEPS", value_parser = parse_positive_u32, help = "Per-trial turn-loop step cap; overrides an agent file's own maxSteps")]
    pub max_steps: Option<u32>,

    #[arg(long = "budget-usd", env = "AGENTUSE_BUDGET_USD", value_parser = parse_positive_f64, help = "Per-scenario cost budget in USD; remaining trials in a scenario are skipped once exceeded")]
    pub budget_usd: Option<f64>,

    #[arg(
        long = "project-suites-dir",
        env = "AGENTUSE_SUITES_DIR",
        default_value = "suites",
        help = "Project-local directory searched when `suite` is a bare name"
    )]
    pub project_suites_dir: PathBuf,

    #[arg(
        long = "builtin-examples-dir",
        env = "AGENTUSE_EXAMPLES_DIR",
        default_value = "examples/suites",
        help = "Built-in examples directory searched as a fallback when `suite` is a bare name"
    )]
    pub builtin_examples_dir: PathBuf,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase log verbosity; repeatable")]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_bench_invocation_with_repeated_model_flags() {
        let cli = Cli::parse_from([
            "agentuse",
            "bench",
            "my-suite",
            "--model",
            "openai:gpt-4o-mini",
            "--model",
            "anthropic:claude-3-5-sonnet",
            "--runs",
            "5",
        ]);
        let Command::Bench(args) = cli.command;
        assert_eq!(args.suite, "my-suite");
        assert_eq!(args.model, vec!["openai:gpt-4o-mini", "anthropic:claude-3-5-sonnet"]);
        assert_eq!(args.runs, Some(5));
    }

    #[test]
    fn rejects_a_zero_runs_value() {
        let result = Cli::try_parse_from(["agentuse", "bench", "my-suite", "--runs", "0"]);
        assert!(result.is_err());
    }
}
