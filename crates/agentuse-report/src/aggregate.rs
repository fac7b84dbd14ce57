//! Rolls a suite's raw [`TrialResult`]s up into the per-scenario,
//! per-agent and per-model aggregates a rendered report reads from, then
//! runs the cross-model relative-efficiency second pass and ranks the
//! models.

use std::collections::BTreeMap;

use agentuse_model::{
    AgentAggregate, AgentResult, Difficulty, ErrorCategory, GoalMetrics, LatencyStats, ModelAggregate,
    ModelId, ModelResult, RankedModel, ScenarioAggregate, ScenarioResult, TokenEfficiency,
    ToolMetric, TrialResult,
};

/// A trial counts as successful for pass@k, consistency and efficiency
/// purposes only when it both executed cleanly and its output/artifact
/// checks passed; a trial that ran to completion but failed validation is
/// not a success for these formulas even though `execution.success` is
/// `true`.
fn trial_succeeded(trial: &TrialResult) -> bool {
    trial.execution.success && trial.is_fully_valid()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (p * (sorted.len() - 1) as f64).round() as usize;
    sorted[rank.min(sorted.len() - 1)]
}

fn latency_stats(trials: &[TrialResult]) -> LatencyStats {
    let mut durations: Vec<f64> = trials
        .iter()
        .map(|trial| trial.execution.duration_ms as f64)
        .collect();
    durations.sort_by(|a, b| a.total_cmp(b));
    let median = if durations.is_empty() {
        0.0
    } else if durations.len() % 2 == 0 {
        let mid = durations.len() / 2;
        (durations[mid - 1] + durations[mid]) / 2.0
    } else {
        durations[durations.len() / 2]
    };
    LatencyStats {
        mean_ms: mean(&durations),
        median_ms: median,
        p95_ms: percentile(&durations, 0.95),
        stddev_ms: stddev(&durations),
    }
}

fn tool_metrics(trials: &[TrialResult]) -> Vec<ToolMetric> {
    let mut by_name: BTreeMap<&str, (u32, u32, u32, u64)> = BTreeMap::new();
    for trial in trials {
        for trace in &trial.tool_calls.traces {
            if !trace.is_tool_call() {
                continue;
            }
            let entry = by_name.entry(trace.name()).or_insert((0, 0, 0, 0));
            entry.0 += 1;
            entry.3 += trace.duration_ms();
            match trace.succeeded() {
                Some(true) => entry.1 += 1,
                Some(false) => entry.2 += 1,
                None => {}
            }
        }
    }
    by_name
        .into_iter()
        .map(|(name, (total, successful, failed, duration_sum))| ToolMetric {
            name: name.to_string(),
            total,
            successful,
            failed,
            success_rate: if total == 0 {
                0.0
            } else {
                successful as f64 / total as f64
            },
            mean_duration_ms: if total == 0 {
                0.0
            } else {
                duration_sum as f64 / total as f64
            },
        })
        .collect()
}

fn error_counts(trials: &[TrialResult]) -> BTreeMap<ErrorCategory, u32> {
    let mut counts = BTreeMap::new();
    for trial in trials {
        if let Some(category) = trial.error_category() {
            *counts.entry(category).or_insert(0) += 1;
        }
    }
    counts
}

fn token_efficiency(trials: &[TrialResult]) -> TokenEfficiency {
    let successful: Vec<&TrialResult> = trials.iter().filter(|t| trial_succeeded(t)).collect();
    if successful.is_empty() {
        return TokenEfficiency::default();
    }
    let n = successful.len() as f64;
    let input: u64 = successful.iter().map(|t| t.usage.input_tokens).sum();
    let output: u64 = successful.iter().map(|t| t.usage.output_tokens).sum();
    let total: u64 = successful.iter().map(|t| t.usage.total_tokens).sum();
    TokenEfficiency {
        input_per_success: input as f64 / n,
        output_per_success: output as f64 / n,
        total_per_success: total as f64 / n,
    }
}

fn goal_metrics(trials: &[TrialResult]) -> Option<GoalMetrics> {
    let with_goals: Vec<&GoalMetrics> = trials
        .iter()
        .filter_map(|t| t.goals.as_ref().map(|g| &g.metrics))
        .collect();
    if with_goals.is_empty() {
        return None;
    }
    let n = with_goals.len() as f64;
    Some(GoalMetrics {
        total_goals: (with_goals.iter().map(|m| m.total_goals).sum::<u32>() as f64 / n).round()
            as u32,
        completed_goals: (with_goals.iter().map(|m| m.completed_goals).sum::<u32>() as f64 / n)
            .round() as u32,
        failed_goals: (with_goals.iter().map(|m| m.failed_goals).sum::<u32>() as f64 / n).round()
            as u32,
        abandoned_goals: (with_goals.iter().map(|m| m.abandoned_goals).sum::<u32>() as f64 / n)
            .round() as u32,
        goal_completion_rate: mean(
            &with_goals.iter().map(|m| m.goal_completion_rate).collect::<Vec<_>>(),
        ),
        avg_attempts_per_goal: mean(
            &with_goals.iter().map(|m| m.avg_attempts_per_goal).collect::<Vec<_>>(),
        ),
        tool_call_success_rate: mean(
            &with_goals.iter().map(|m| m.tool_call_success_rate).collect::<Vec<_>>(),
        ),
        tool_call_failure_rate: mean(
            &with_goals.iter().map(|m| m.tool_call_failure_rate).collect::<Vec<_>>(),
        ),
        recovery_rate: mean(&with_goals.iter().map(|m| m.recovery_rate).collect::<Vec<_>>()),
    })
}

/// Builds one scenario's aggregate from its `n = runs` trials. `efficiency`
/// and `tool_call_efficiency` are left at `0.0`; [`apply_relative_efficiency`]
/// fills them in once every model's scenario results are available.
pub fn aggregate_scenario(
    scenario_id: String,
    name: String,
    difficulty: Option<Difficulty>,
    trials: Vec<TrialResult>,
) -> ScenarioResult {
    let n = trials.len() as u32;
    let successful = trials.iter().filter(|t| trial_succeeded(t)).count() as u32;
    let completion_rate = if n == 0 {
        0.0
    } else {
        successful as f64 / n as f64
    };
    let p = completion_rate;
    let pass_k = 1.0 - (1.0 - p).powi(n as i32);

    let outcomes: Vec<f64> = trials
        .iter()
        .map(|t| if trial_succeeded(t) { 1.0 } else { 0.0 })
        .collect();
    let consistency = 1.0 - stddev(&outcomes);

    let costed: Vec<f64> = trials
        .iter()
        .filter_map(|t| t.usage.estimated_cost_usd)
        .collect();
    let cost_mean_usd = (!costed.is_empty()).then(|| mean(&costed));
    let cost_total_usd = (!costed.is_empty()).then(|| costed.iter().sum());
    let successful_costed: Vec<f64> = trials
        .iter()
        .filter(|t| trial_succeeded(t))
        .filter_map(|t| t.usage.estimated_cost_usd)
        .collect();
    let cost_per_success_usd = (!successful_costed.is_empty()).then(|| mean(&successful_costed));

    let aggregate = ScenarioAggregate {
        n,
        completion_rate,
        pass_k,
        consistency,
        latency: latency_stats(&trials),
        cost_mean_usd,
        cost_total_usd,
        cost_per_success_usd,
        tool_metrics: tool_metrics(&trials),
        error_counts: error_counts(&trials),
        token_efficiency: token_efficiency(&trials),
        goal_metrics: goal_metrics(&trials),
        efficiency: 0.0,
        tool_call_efficiency: 0.0,
    };

    ScenarioResult {
        scenario_id,
        name,
        difficulty,
        trials,
        aggregate,
    }
}

/// Means of per-scenario metrics; `efficiency` is left at `0.0` until the
/// cross-model second pass runs.
pub fn aggregate_agent(agent_path: String, scenarios: Vec<ScenarioResult>) -> AgentResult {
    let completion_rate = mean(
        &scenarios.iter().map(|s| s.aggregate.completion_rate).collect::<Vec<_>>(),
    );
    let pass_k = mean(&scenarios.iter().map(|s| s.aggregate.pass_k).collect::<Vec<_>>());
    let consistency = mean(
        &scenarios.iter().map(|s| s.aggregate.consistency).collect::<Vec<_>>(),
    );
    let latency = LatencyStats {
        mean_ms: mean(&scenarios.iter().map(|s| s.aggregate.latency.mean_ms).collect::<Vec<_>>()),
        median_ms: mean(
            &scenarios.iter().map(|s| s.aggregate.latency.median_ms).collect::<Vec<_>>(),
        ),
        p95_ms: mean(&scenarios.iter().map(|s| s.aggregate.latency.p95_ms).collect::<Vec<_>>()),
        stddev_ms: mean(
            &scenarios.iter().map(|s| s.aggregate.latency.stddev_ms).collect::<Vec<_>>(),
        ),
    };

    AgentResult {
        agent_path,
        scenarios,
        aggregate: AgentAggregate {
            completion_rate,
            pass_k,
            consistency,
            latency,
            efficiency: 0.0,
            overall_score: 60.0 * pass_k,
        },
    }
}

/// Means of per-agent metrics. The overall score before the efficiency
/// pass is `60 * passK`, since `efficiency` is still `0.0`.
pub fn aggregate_model(model: ModelId, agents: Vec<AgentResult>) -> ModelResult {
    let completion_rate = mean(
        &agents.iter().map(|a| a.aggregate.completion_rate).collect::<Vec<_>>(),
    );
    let pass_k = mean(&agents.iter().map(|a| a.aggregate.pass_k).collect::<Vec<_>>());
    let consistency = mean(
        &agents.iter().map(|a| a.aggregate.consistency).collect::<Vec<_>>(),
    );

    ModelResult {
        model,
        agents,
        aggregate: ModelAggregate {
            completion_rate,
            pass_k,
            consistency,
            efficiency: 0.0,
            overall_score: 60.0 * pass_k,
        },
    }
}

/// Mean tool-call count (or `avgAttemptsPerGoal`) over a scenario's
/// successful trials for one model, `None` when it has no successful
/// trials to average.
fn mean_over_successful<F: Fn(&TrialResult) -> f64>(trials: &[TrialResult], extract: F) -> Option<f64> {
    let values: Vec<f64> = trials.iter().filter(|t| trial_succeeded(t)).map(extract).collect();
    (!values.is_empty()).then(|| mean(&values))
}

fn relative_efficiency(means: &[Option<f64>]) -> Vec<f64> {
    let reference = means
        .iter()
        .filter_map(|m| *m)
        .fold(f64::INFINITY, f64::min);
    means
        .iter()
        .map(|mean_value| match mean_value {
            Some(value) if *value > 0.0 && reference.is_finite() => reference / value,
            Some(_) => 0.0,
            None => 0.0,
        })
        .collect()
}

/// Cross-model relative efficiency second pass (SPEC §4.E). For every
/// scenario id present in the suite, compares each model's mean
/// successful-trial tool-call count (and separately, mean
/// `avgAttemptsPerGoal`) against the smallest such mean across models,
/// writing `efficiency`/`tool_call_efficiency` back into each model's
/// matching [`ScenarioAggregate`], then propagates the mean upward into
/// each [`AgentAggregate`] and [`ModelAggregate`] and recomputes every
/// model's overall score.
///
/// Scenario ids are unique within a suite (enforced at load time), so a
/// scenario id alone identifies the same scenario across every model's
/// results.
pub fn apply_relative_efficiency(models: &mut [ModelResult]) {
    let mut scenario_ids: Vec<String> = Vec::new();
    for model in models.iter() {
        for agent in &model.agents {
            for scenario in &agent.scenarios {
                if !scenario_ids.contains(&scenario.scenario_id) {
                    scenario_ids.push(scenario.scenario_id.clone());
                }
            }
        }
    }

    for scenario_id in &scenario_ids {
        let tool_call_means: Vec<Option<f64>> = models
            .iter()
            .map(|model| {
                find_scenario(model, scenario_id)
                    .and_then(|s| mean_over_successful(&s.trials, |t| t.tool_calls.total as f64))
            })
            .collect();
        let attempts_means: Vec<Option<f64>> = models
            .iter()
            .map(|model| {
                find_scenario(model, scenario_id).and_then(|s| {
                    mean_over_successful(&s.trials, |t| {
                        t.goals.as_ref().map(|g| g.metrics.avg_attempts_per_goal).unwrap_or(0.0)
                    })
                })
            })
            .collect();

        let tool_call_efficiencies = relative_efficiency(&tool_call_means);
        let attempts_efficiencies = relative_efficiency(&attempts_means);

        for (model, (efficiency, tool_call_efficiency)) in models
            .iter_mut()
            .zip(tool_call_efficiencies.into_iter().zip(attempts_efficiencies))
        {
            if let Some(scenario) = find_scenario_mut(model, scenario_id) {
                scenario.aggregate.efficiency = efficiency;
                scenario.aggregate.tool_call_efficiency = tool_call_efficiency;
            }
        }
    }

    for model in models.iter_mut() {
        for agent in &mut model.agents {
            agent.aggregate.efficiency = mean(
                &agent.scenarios.iter().map(|s| s.aggregate.efficiency).collect::<Vec<_>>(),
            );
            agent.aggregate.overall_score = 60.0 * agent.aggregate.pass_k + 40.0 * agent.aggregate.efficiency;
        }
        model.aggregate.efficiency = mean(
            &model.agents.iter().map(|a| a.aggregate.efficiency).collect::<Vec<_>>(),
        );
        model.aggregate.overall_score =
            60.0 * model.aggregate.pass_k + 40.0 * model.aggregate.efficiency;
    }
}

fn find_scenario<'a>(model: &'a ModelResult, scenario_id: &str) -> Option<&'a ScenarioResult> {
    model
        .agents
        .iter()
        .flat_map(|agent| agent.scenarios.iter())
        .find(|s| s.scenario_id == scenario_id)
}

fn find_scenario_mut<'a>(model: &'a mut ModelResult, scenario_id: &str) -> Option<&'a mut ScenarioResult> {
    model
        .agents
        .iter_mut()
        .flat_map(|agent| agent.scenarios.iter_mut())
        .find(|s| s.scenario_id == scenario_id)
}

/// `60 * weighted passK + 40 * weighted efficiency`, the per-scenario
/// weight being `1|2|3` for `easy|medium|hard` (undeclared difficulty
/// weighs `1`), flattened over every scenario the model ran across all
/// of its agents.
fn weighted_overall_score(model: &ModelResult) -> f64 {
    let mut weighted_pass_k = 0.0;
    let mut weighted_efficiency = 0.0;
    let mut total_weight = 0.0;
    for agent in &model.agents {
        for scenario in &agent.scenarios {
            let weight = scenario.difficulty.map(Difficulty::weight).unwrap_or(1) as f64;
            weighted_pass_k += weight * scenario.aggregate.pass_k;
            weighted_efficiency += weight * scenario.aggregate.efficiency;
            total_weight += weight;
        }
    }
    if total_weight == 0.0 {
        return model.aggregate.overall_score;
    }
    60.0 * (weighted_pass_k / total_weight) + 40.0 * (weighted_efficiency / total_weight)
}

/// Sorts models by overall score descending and assigns ranks `1..N`. When
/// any scenario in the suite declares a difficulty, ranking uses the
/// weighted-score variant instead of the plain `ModelAggregate.overall_score`.
pub fn rank_models(models: &[ModelResult]) -> Vec<RankedModel> {
    let any_difficulty = models.iter().any(|model| {
        model
            .agents
            .iter()
            .any(|agent| agent.scenarios.iter().any(|s| s.difficulty.is_some()))
    });

    let mut scored: Vec<(&ModelResult, f64)> = models
        .iter()
        .map(|model| {
            let score = if any_difficulty {
                weighted_overall_score(model)
            } else {
                model.aggregate.overall_score
            };
            (model, score)
        })
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    scored
        .into_iter()
        .enumerate()
        .map(|(index, (model, score))| RankedModel {
            model: model.model.clone(),
            rank: index as u32 + 1,
            overall_score: score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentuse_model::{ArtifactResult, ExecutionOutcome, OutputResult, ToolCallSummary, UsageStats};

    fn trial(scenario_id: &str, success: bool, tool_calls: u32) -> TrialResult {
        TrialResult {
            trial_number: 0,
            scenario_id: scenario_id.to_string(),
            model: ModelId::new("anthropic:claude"),
            execution: ExecutionOutcome {
                success,
                duration_ms: 100,
                finish_reason: "stop".to_string(),
                error: None,
            },
            usage: UsageStats::default(),
            tool_calls: ToolCallSummary {
                total: tool_calls,
                names: vec![],
                traces: vec![],
            },
            output: OutputResult {
                text: String::new(),
                valid: success,
                validation_details: vec![],
            },
            artifacts: ArtifactResult::default(),
            goals: None,
        }
    }

    #[test]
    fn pass_k_matches_the_closed_form_identity() {
        let trials = vec![
            trial("s1", true, 1),
            trial("s1", true, 1),
            trial("s1", false, 1),
        ];
        let result = aggregate_scenario("s1".to_string(), "Scenario 1".to_string(), None, trials);
        let expected = 1.0 - (1.0 - result.aggregate.completion_rate).powi(3);
        assert!((result.aggregate.pass_k - expected).abs() < 1e-9);
    }

    #[test]
    fn relative_efficiency_gives_the_cheapest_model_a_score_of_one() {
        let cheap = aggregate_model(
            ModelId::new("anthropic:cheap"),
            vec![aggregate_agent(
                "agent.md".to_string(),
                vec![aggregate_scenario(
                    "s1".to_string(),
                    "S1".to_string(),
                    None,
                    vec![trial("s1", true, 2)],
                )],
            )],
        );
        let pricey = aggregate_model(
            ModelId::new("anthropic:pricey"),
            vec![aggregate_agent(
                "agent.md".to_string(),
                vec![aggregate_scenario(
                    "s1".to_string(),
                    "S1".to_string(),
                    None,
                    vec![trial("s1", true, 4)],
                )],
            )],
        );
        let mut models = vec![cheap, pricey];
        apply_relative_efficiency(&mut models);
        assert_eq!(models[0].agents[0].scenarios[0].aggregate.efficiency, 1.0);
        assert_eq!(models[1].agents[0].scenarios[0].aggregate.efficiency, 0.5);
    }

    #[test]
    fn ranking_is_a_permutation_of_one_through_n() {
        let models = vec![
            aggregate_model(ModelId::new("a:one"), vec![]),
            aggregate_model(ModelId::new("a:two"), vec![]),
        ];
        let ranked = rank_models(&models);
        let mut ranks: Vec<u32> = ranked.iter().map(|r| r.rank).collect();
        ranks.sort();
        assert_eq!(ranks, vec![1, 2]);
    }
}
