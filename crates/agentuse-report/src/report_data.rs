//! The reporter's intermediate record. Stable given the same
//! [`SuiteResult`] and a fixed `generated_at`, since every renderer reads
//! only from this struct and never touches a clock or the filesystem
//! itself (SPEC §8, property 8: idempotent reporting).

use agentuse_core::Clock;
use agentuse_model::{AgentResult, ErrorSummary, ModelAggregate, ModelId, RankedModel, SuiteResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelReportSection {
    pub model: ModelId,
    pub aggregate: ModelAggregate,
    pub agents: Vec<AgentResult>,
    pub errors: ErrorSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    pub suite_id: String,
    pub run_id: String,
    pub generated_at: String,
    pub models: Vec<ModelReportSection>,
    pub ranking: Vec<RankedModel>,
}

/// Builds the reporter's intermediate record from a finished
/// [`SuiteResult`]. `clock` supplies the single `generated_at` timestamp;
/// every other field is a pure function of `suite_result`.
pub fn build_report_data(suite_result: &SuiteResult, clock: &dyn Clock) -> ReportData {
    let models = suite_result
        .models
        .iter()
        .map(|model| {
            let trials = model
                .agents
                .iter()
                .flat_map(|agent| agent.scenarios.iter())
                .flat_map(|scenario| scenario.trials.iter());
            ModelReportSection {
                model: model.model.clone(),
                aggregate: model.aggregate,
                agents: model.agents.clone(),
                errors: ErrorSummary::from_trials(trials),
            }
        })
        .collect();

    ReportData {
        suite_id: suite_result.suite_id.clone(),
        run_id: suite_result.run_id.clone(),
        generated_at: clock.now_iso8601(),
        models,
        ranking: suite_result.ranking.clone(),
    }
}
