use agentuse_cli::args::{Cli, Command};
use agentuse_cli::exit_code::{is_configuration_error, CONFIG_ERROR, INTERNAL_ERROR, SUCCESS};
use agentuse_cli::orchestrator::run_bench;
use agentuse_cli::run_config::RunConfiguration;
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let Command::Bench(bench_args) = cli.command;
    agentuse_cli::logging::init(bench_args.verbose);

    let config = RunConfiguration::from_args(&bench_args);
    match run_bench(&bench_args.suite, &config).await {
        Ok(outcome) => {
            tracing::info!(
                suite_id = %outcome.suite_result.suite_id,
                run_id = %outcome.suite_result.run_id,
                report = %outcome.report_paths.json.display(),
                "benchmark run complete"
            );
            for ranked in &outcome.suite_result.ranking {
                tracing::info!(
                    rank = ranked.rank,
                    model = %ranked.model,
                    score = ranked.overall_score,
                    "ranked model"
                );
            }
            std::process::exit(SUCCESS);
        }
        Err(error) => {
            if is_configuration_error(&error) {
                eprintln!("configuration error: {error:#}");
                std::process::exit(CONFIG_ERROR);
            }
            eprintln!("internal error: {error:#}");
            std::process::exit(INTERNAL_ERROR);
        }
    }
}
