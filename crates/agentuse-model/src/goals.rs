use serde::{Deserialize, Serialize};

/// Lifecycle state of one LLM-declared goal within a trial.
///
/// Transitions: `Active -> {Completed, Failed}` only via an explicit
/// completion event; `Active -> Abandoned` only when superseded by a new
/// declaration or at trial end. Terminal states never transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Active,
    Completed,
    Failed,
    Abandoned,
}

impl GoalStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, GoalStatus::Active)
    }
}

/// One tool call attributed to the active goal at the time it completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalToolCall {
    pub tool_name: String,
    pub success: bool,
    pub duration_ms: u64,
}

/// An LLM-declared sub-task, tracked by the [`GoalTracker`] actor to
/// enable efficiency and recovery metrics.
///
/// [`GoalTracker`]: https://docs.rs/agentuse-goals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedGoal {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_time_unix_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time_unix_ms: Option<u64>,
    pub status: GoalStatus,
    pub tool_calls: Vec<GoalToolCall>,
}

impl TrackedGoal {
    pub fn had_failed_tool_call(&self) -> bool {
        self.tool_calls.iter().any(|call| !call.success)
    }
}

/// Derived totals and rates computed from a trial's (or an aggregate's)
/// tracked goals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalMetrics {
    pub total_goals: u32,
    pub completed_goals: u32,
    pub failed_goals: u32,
    pub abandoned_goals: u32,
    pub goal_completion_rate: f64,
    pub avg_attempts_per_goal: f64,
    pub tool_call_success_rate: f64,
    pub tool_call_failure_rate: f64,
    pub recovery_rate: f64,
}

impl GoalMetrics {
    /// Computes metrics from a trial's full set of tracked goals, per the
    /// formulas in the goal tracker's metric contract.
    pub fn from_goals(goals: &[TrackedGoal]) -> Self {
        let total_goals = goals.len() as u32;
        if total_goals == 0 {
            return Self {
                total_goals: 0,
                completed_goals: 0,
                failed_goals: 0,
                abandoned_goals: 0,
                goal_completion_rate: 1.0,
                avg_attempts_per_goal: 0.0,
                tool_call_success_rate: 1.0,
                tool_call_failure_rate: 0.0,
                recovery_rate: 1.0,
            };
        }

        let completed_goals = goals
            .iter()
            .filter(|goal| goal.status == GoalStatus::Completed)
            .count() as u32;
        let failed_goals = goals
            .iter()
            .filter(|goal| goal.status == GoalStatus::Failed)
            .count() as u32;
        let abandoned_goals = goals
            .iter()
            .filter(|goal| goal.status == GoalStatus::Abandoned)
            .count() as u32;

        let total_tool_calls: usize = goals.iter().map(|goal| goal.tool_calls.len()).sum();
        let successful_tool_calls: usize = goals
            .iter()
            .flat_map(|goal| goal.tool_calls.iter())
            .filter(|call| call.success)
            .count();

        let goals_with_failure: Vec<&TrackedGoal> = goals
            .iter()
            .filter(|goal| goal.had_failed_tool_call())
            .collect();
        let recovered = goals_with_failure
            .iter()
            .filter(|goal| goal.status == GoalStatus::Completed)
            .count();

        let tool_call_success_rate = if total_tool_calls == 0 {
            1.0
        } else {
            successful_tool_calls as f64 / total_tool_calls as f64
        };

        Self {
            total_goals,
            completed_goals,
            failed_goals,
            abandoned_goals,
            goal_completion_rate: completed_goals as f64 / total_goals as f64,
            avg_attempts_per_goal: total_tool_calls as f64 / total_goals as f64,
            tool_call_success_rate,
            tool_call_failure_rate: 1.0 - tool_call_success_rate,
            recovery_rate: if goals_with_failure.is_empty() {
                1.0
            } else {
                recovered as f64 / goals_with_failure.len() as f64
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(status: GoalStatus, tool_calls: Vec<(bool, u64)>) -> TrackedGoal {
        TrackedGoal {
            id: "g-0".to_string(),
            name: "goal".to_string(),
            description: None,
            start_time_unix_ms: 0,
            end_time_unix_ms: Some(1),
            status,
            tool_calls: tool_calls
                .into_iter()
                .map(|(success, duration_ms)| GoalToolCall {
                    tool_name: "tool".to_string(),
                    success,
                    duration_ms,
                })
                .collect(),
        }
    }

    #[test]
    fn no_goals_is_treated_as_fully_recovered_and_successful_by_convention() {
        let metrics = GoalMetrics::from_goals(&[]);
        assert_eq!(metrics.total_goals, 0);
        assert_eq!(metrics.goal_completion_rate, 1.0);
        assert_eq!(metrics.recovery_rate, 1.0);
    }

    #[test]
    fn recovery_rate_counts_only_goals_that_both_failed_and_then_completed() {
        // Scenario D: one goal, 3 tool calls (one fails, then recovers), completes successfully.
        let goals = vec![goal(
            GoalStatus::Completed,
            vec![(true, 10), (false, 5), (true, 10)],
        )];
        let metrics = GoalMetrics::from_goals(&goals);
        assert_eq!(metrics.recovery_rate, 1.0);
        assert!((metrics.tool_call_failure_rate - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(metrics.avg_attempts_per_goal, 3.0);
    }

    #[test]
    fn recovery_rate_is_zero_when_no_failing_goal_ever_completes() {
        let goals = vec![
            goal(GoalStatus::Failed, vec![(false, 1)]),
            goal(GoalStatus::Abandoned, vec![(false, 1)]),
        ];
        let metrics = GoalMetrics::from_goals(&goals);
        assert_eq!(metrics.recovery_rate, 0.0);
    }

    #[test]
    fn goal_completion_rate_divides_completed_by_total_when_goals_exist() {
        let goals = vec![
            goal(GoalStatus::Completed, vec![]),
            goal(GoalStatus::Failed, vec![]),
            goal(GoalStatus::Abandoned, vec![]),
        ];
        let metrics = GoalMetrics::from_goals(&goals);
        assert!((metrics.goal_completion_rate - 1.0 / 3.0).abs() < 1e-9);
    }
}
