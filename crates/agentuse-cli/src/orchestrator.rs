use std::path::Path;

use agentuse_core::time_utils::system_clock;
use agentuse_core::time_utils::Clock;
use agentuse_core::{RunEventLog, RunEventRecord};
use agentuse_model::SuiteResult;
use agentuse_report::{
    aggregate_agent, aggregate_model, aggregate_scenario, apply_relative_efficiency,
    build_report_data, rank_models, write_report_files, ReportFilePaths,
};
use agentuse_suite::{LoadedSuite, SuiteLoader};
use agentuse_trial::{run_trial, CostBudgetTracker, TrialDeps, TrialRequest};
use anyhow::{Context, Result};
use tracing::Instrument;

use crate::provider_factory::build_client;
use crate::run_config::RunConfiguration;

pub struct BenchOutcome {
    pub suite_result: SuiteResult,
    pub report_paths: ReportFilePaths,
}

/// Runs every `(model, agent, scenario, trial)` cell the suite's config
/// (as adjusted by `config`) describes, sequentially, and writes the
/// suite's report artifacts. Models run one after another so each
/// model's scenarios can share one [`CostBudgetTracker`].
pub async fn run_bench(suite_name: &str, config: &RunConfiguration) -> Result<BenchOutcome> {
    let loader = SuiteLoader::new(config.project_suites_dir(), config.builtin_examples_dir());
    let LoadedSuite { suite, agents } = loader
        .load(suite_name)
        .with_context(|| format!("failed to load suite '{suite_name}'"))?;

    let models = config.resolve_models(&suite.config.models);
    let runs = config.resolve_runs(suite.config.runs);
    let clock = system_clock();
    let run_id = agentuse_core::new_run_id(clock.now_unix_ms());
    let events = RunEventLog::new(config.output_dir.join("run-events.jsonl"));
    record_event(&events, &RunEventRecord {
        ts_unix_ms: clock.now_unix_ms(),
        run_id: &run_id,
        kind: "suite_started",
        model: None,
        scenario_id: None,
        trial_number: None,
        detail: Some(suite.id.as_str()),
    });

    let mut model_results = Vec::with_capacity(models.len());
    for model in &models {
        let client = build_client(model)
            .with_context(|| format!("failed to build a client for model '{model}'"))?;
        let mut budget = CostBudgetTracker::new(config.budget_usd);

        let mut agent_results = Vec::with_capacity(suite.tests.len());
        for test in &suite.tests {
            let agent = agents
                .get(&test.agent)
                .with_context(|| format!("suite references an unloaded agent '{}'", test.agent))?;
            let resolved_agent = agent.config.with_resolved_model(model);
            let suite_dir = Path::new(&agent.source_path)
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();

            let mut scenario_results = Vec::with_capacity(test.scenarios.len());
            for scenario in &test.scenarios {
                let mut trials = Vec::with_capacity(runs as usize);
                for trial_number in 1..=runs {
                    if budget.scenario_is_exhausted(&scenario.id) {
                        tracing::info!(
                            scenario_id = %scenario.id,
                            model = %model,
                            "skipping remaining trials, scenario's cost budget is exhausted"
                        );
                        record_event(&events, &RunEventRecord {
                            ts_unix_ms: clock.now_unix_ms(),
                            run_id: &run_id,
                            kind: "budget_exhausted",
                            model: Some(model.as_str()),
                            scenario_id: Some(scenario.id.as_str()),
                            trial_number: None,
                            detail: None,
                        });
                        break;
                    }

                    let span = tracing::info_span!(
                        "trial",
                        scenario_id = %scenario.id,
                        trial_number,
                        model = %model
                    );

                    let request = TrialRequest {
                        agent: &resolved_agent,
                        agent_mcp_servers: &resolved_agent.mcp_servers,
                        scenario,
                        model,
                        trial_number,
                        suite_dir: &suite_dir,
                        output_dir: &config.output_dir,
                        timeout: Some(std::time::Duration::from_secs(config.timeout_secs)),
                        max_steps: config.max_steps_override,
                    };
                    let deps = TrialDeps {
                        llm: client.as_ref(),
                        judge: client.as_ref(),
                        clock: &clock,
                    };

                    record_event(&events, &RunEventRecord {
                        ts_unix_ms: clock.now_unix_ms(),
                        run_id: &run_id,
                        kind: "trial_started",
                        model: Some(model.as_str()),
                        scenario_id: Some(scenario.id.as_str()),
                        trial_number: Some(trial_number),
                        detail: None,
                    });

                    let result = run_trial(request, deps).instrument(span).await;
                    if let Some(cost) = result.usage.estimated_cost_usd {
                        budget.record(&scenario.id, cost);
                    }
                    record_event(&events, &RunEventRecord {
                        ts_unix_ms: clock.now_unix_ms(),
                        run_id: &run_id,
                        kind: "trial_finished",
                        model: Some(model.as_str()),
                        scenario_id: Some(scenario.id.as_str()),
                        trial_number: Some(trial_number),
                        detail: Some(result.execution.finish_reason.as_str()),
                    });
                    trials.push(result);
                }
                scenario_results.push(aggregate_scenario(
                    scenario.id.clone(),
                    scenario.name.clone(),
                    scenario.difficulty,
                    trials,
                ));
            }
            agent_results.push(aggregate_agent(test.agent.clone(), scenario_results));
        }
        model_results.push(aggregate_model(model.clone(), agent_results));
    }

    apply_relative_efficiency(&mut model_results);
    let ranking = rank_models(&model_results);

    let suite_result = SuiteResult {
        suite_id: suite.id.clone(),
        run_id: run_id.clone(),
        models: model_results,
        ranking,
    };

    let report_data = build_report_data(&suite_result, clock.as_ref());
    let report_paths = write_report_files(&report_data, &config.output_dir)?;

    record_event(&events, &RunEventRecord {
        ts_unix_ms: clock.now_unix_ms(),
        run_id: &run_id,
        kind: "suite_finished",
        model: None,
        scenario_id: None,
        trial_number: None,
        detail: Some(suite.id.as_str()),
    });

    Ok(BenchOutcome {
        suite_result,
        report_paths,
    })
}

/// Run-event recording is ambient diagnostics, not part of the run's
/// correctness — a write failure is logged and otherwise ignored.
fn record_event(events: &RunEventLog, record: &RunEventRecord<'_>) {
    if let Err(error) = events.record(record) {
        tracing::warn!(%error, "failed to append run event");
    }
}
