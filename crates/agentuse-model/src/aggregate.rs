use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::goals::GoalMetrics;
use crate::suite::{Difficulty, ModelId};
use crate::trial::{ErrorCategory, TrialResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolMetric {
    pub name: String,
    pub total: u32,
    pub successful: u32,
    pub failed: u32,
    pub success_rate: f64,
    pub mean_duration_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct TokenEfficiency {
    pub input_per_success: f64,
    pub output_per_success: f64,
    pub total_per_success: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct LatencyStats {
    pub mean_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
    pub stddev_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAggregate {
    pub n: u32,
    pub completion_rate: f64,
    pub pass_k: f64,
    pub consistency: f64,
    pub latency: LatencyStats,
    pub cost_mean_usd: Option<f64>,
    pub cost_total_usd: Option<f64>,
    pub cost_per_success_usd: Option<f64>,
    pub tool_metrics: Vec<ToolMetric>,
    pub error_counts: BTreeMap<ErrorCategory, u32>,
    pub token_efficiency: TokenEfficiency,
    pub goal_metrics: Option<GoalMetrics>,
    /// Cross-model relative efficiency for this scenario, 1.0 for the
    /// model with the fewest mean successful-trial tool calls. Left at
    /// 0.0 until the second aggregation pass runs.
    pub efficiency: f64,
    /// Same idea as `efficiency` but computed from `avgAttemptsPerGoal`
    /// rather than raw tool-call counts.
    pub tool_call_efficiency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_id: String,
    pub name: String,
    pub difficulty: Option<Difficulty>,
    pub trials: Vec<TrialResult>,
    pub aggregate: ScenarioAggregate,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct AgentAggregate {
    pub completion_rate: f64,
    pub pass_k: f64,
    pub consistency: f64,
    pub latency: LatencyStats,
    /// Mean of this agent's scenarios' relative efficiencies. Left at 0.0
    /// until the cross-model second pass runs.
    pub efficiency: f64,
    pub overall_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    pub agent_path: String,
    pub scenarios: Vec<ScenarioResult>,
    pub aggregate: AgentAggregate,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ModelAggregate {
    pub completion_rate: f64,
    pub pass_k: f64,
    pub consistency: f64,
    pub efficiency: f64,
    /// `60 * passK + 40 * efficiency`, recomputed after the relative
    /// efficiency second pass.
    pub overall_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResult {
    pub model: ModelId,
    pub agents: Vec<AgentResult>,
    pub aggregate: ModelAggregate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedModel {
    pub model: ModelId,
    pub rank: u32,
    pub overall_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteResult {
    pub suite_id: String,
    pub run_id: String,
    pub models: Vec<ModelResult>,
    pub ranking: Vec<RankedModel>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_aggregate_serializes_error_counts_as_a_stable_map() {
        let mut error_counts = BTreeMap::new();
        error_counts.insert(ErrorCategory::Timeout, 2);
        let aggregate = ScenarioAggregate {
            n: 5,
            completion_rate: 0.8,
            pass_k: 0.95,
            consistency: 0.9,
            latency: LatencyStats::default(),
            cost_mean_usd: Some(0.01),
            cost_total_usd: Some(0.05),
            cost_per_success_usd: Some(0.01),
            tool_metrics: vec![],
            error_counts,
            token_efficiency: TokenEfficiency::default(),
            goal_metrics: None,
            efficiency: 0.0,
            tool_call_efficiency: 0.0,
        };
        let encoded = serde_json::to_value(&aggregate).expect("encode");
        assert_eq!(encoded["error_counts"]["timeout"], 2);
    }
}
