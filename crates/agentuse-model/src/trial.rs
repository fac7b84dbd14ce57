use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::goals::{GoalMetrics, TrackedGoal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Timeout,
    RuntimeError,
    ValidationFailure,
    ToolError,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialError {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
    pub category: ErrorCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub success: bool,
    pub duration_ms: u64,
    pub finish_reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TrialError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct UsageStats {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost_usd: Option<f64>,
}

/// One completed invocation recorded in a trial's trace timeline.
/// Ordering within a trial is the chronological order of invocation
/// completion, and that order is preserved through goal-tracker
/// reconciliation into the stored [`TrialResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolCallTrace {
    Llm {
        name: String,
        duration_ms: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tokens: Option<UsageStats>,
    },
    Tool {
        name: String,
        duration_ms: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        input: Option<serde_json::Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        success: Option<bool>,
    },
    Subagent {
        name: String,
        duration_ms: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        success: Option<bool>,
    },
}

impl ToolCallTrace {
    pub fn name(&self) -> &str {
        match self {
            ToolCallTrace::Llm { name, .. }
            | ToolCallTrace::Tool { name, .. }
            | ToolCallTrace::Subagent { name, .. } => name,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        match self {
            ToolCallTrace::Llm { duration_ms, .. }
            | ToolCallTrace::Tool { duration_ms, .. }
            | ToolCallTrace::Subagent { duration_ms, .. } => *duration_ms,
        }
    }

    pub fn is_tool_call(&self) -> bool {
        matches!(self, ToolCallTrace::Tool { .. })
    }

    /// `Some(true/false)` for a tool or subagent trace that reported a
    /// success flag; `None` for an `llm` trace, which has no pass/fail
    /// notion of its own.
    pub fn succeeded(&self) -> Option<bool> {
        match self {
            ToolCallTrace::Llm { .. } => None,
            ToolCallTrace::Tool { success, .. } => *success,
            ToolCallTrace::Subagent { success, .. } => *success,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ToolCallTotals {
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallSummary {
    pub total: u32,
    pub names: Vec<String>,
    pub traces: Vec<ToolCallTrace>,
}

impl ToolCallSummary {
    pub fn from_traces(traces: Vec<ToolCallTrace>) -> Self {
        let total = traces.iter().filter(|trace| trace.is_tool_call()).count() as u32;
        let mut names: Vec<String> = traces
            .iter()
            .filter(|trace| trace.is_tool_call())
            .map(|trace| trace.name().to_string())
            .collect();
        names.sort();
        names.dedup();
        Self {
            total,
            names,
            traces,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OutputResult {
    pub text: String,
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_details: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactCheckDetail {
    pub path: String,
    pub passed: bool,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ArtifactResult {
    pub checked: u32,
    pub passed: u32,
    pub details: Vec<ArtifactCheckDetail>,
}

impl ArtifactResult {
    pub fn valid(&self) -> bool {
        self.passed == self.checked
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialGoals {
    pub tracked: Vec<TrackedGoal>,
    pub metrics: GoalMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub trial_number: u32,
    pub scenario_id: String,
    pub model: crate::suite::ModelId,
    pub execution: ExecutionOutcome,
    pub usage: UsageStats,
    pub tool_calls: ToolCallSummary,
    pub output: OutputResult,
    pub artifacts: ArtifactResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals: Option<TrialGoals>,
}

impl TrialResult {
    /// The trial is valid overall only when both output and artifact
    /// checks pass; `output.valid` mirrors this conjunction per the
    /// evaluator's combined-validity rule.
    pub fn is_fully_valid(&self) -> bool {
        self.output.valid && self.artifacts.valid()
    }

    pub fn error_category(&self) -> Option<ErrorCategory> {
        self.execution.error.as_ref().map(|error| error.category)
    }
}

/// Per-category error counts with up to ten detailed entries, as surfaced
/// in a rendered report (§7 user-visible error behavior).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ErrorSummary {
    pub counts_by_category: BTreeMap<ErrorCategory, u32>,
    pub detailed: Vec<ErrorDetail>,
    pub overflow_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub scenario_id: String,
    pub trial_number: u32,
    pub category: ErrorCategory,
    pub message: String,
}

impl Ord for ErrorCategory {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        format!("{self:?}").cmp(&format!("{other:?}"))
    }
}

impl PartialOrd for ErrorCategory {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

const MAX_DETAILED_ERRORS: usize = 10;

impl ErrorSummary {
    pub fn from_trials<'a>(trials: impl IntoIterator<Item = &'a TrialResult>) -> Self {
        let mut summary = ErrorSummary::default();
        for trial in trials {
            let Some(error) = trial.execution.error.as_ref() else {
                continue;
            };
            *summary.counts_by_category.entry(error.category).or_insert(0) += 1;
            if summary.detailed.len() < MAX_DETAILED_ERRORS {
                summary.detailed.push(ErrorDetail {
                    scenario_id: trial.scenario_id.clone(),
                    trial_number: trial.trial_number,
                    category: error.category,
                    message: error.message.clone(),
                });
            } else {
                summary.overflow_count += 1;
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suite::ModelId;

    fn tool_trace(name: &str, success: bool) -> ToolCallTrace {
        ToolCallTrace::Tool {
            name: name.to_string(),
            duration_ms: 5,
            input: None,
            success: Some(success),
        }
    }

    #[test]
    fn tool_call_summary_counts_only_tool_traces_and_dedups_names() {
        let traces = vec![
            ToolCallTrace::Llm {
                name: "assistant-turn".to_string(),
                duration_ms: 100,
                tokens: None,
            },
            tool_trace("search", true),
            tool_trace("search", false),
            ToolCallTrace::Subagent {
                name: "sub".to_string(),
                duration_ms: 10,
                success: Some(true),
            },
        ];
        let summary = ToolCallSummary::from_traces(traces);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.names, vec!["search".to_string()]);
    }

    #[test]
    fn trial_result_is_fully_valid_requires_both_output_and_artifacts() {
        let mut trial = sample_trial();
        trial.output.valid = true;
        trial.artifacts = ArtifactResult {
            checked: 1,
            passed: 0,
            details: vec![],
        };
        assert!(!trial.is_fully_valid());

        trial.artifacts.passed = 1;
        assert!(trial.is_fully_valid());
    }

    #[test]
    fn error_summary_caps_detail_and_tracks_overflow() {
        let mut trials = Vec::new();
        for index in 0..12 {
            let mut trial = sample_trial();
            trial.trial_number = index;
            trial.execution.error = Some(TrialError {
                error_type: "timeout".to_string(),
                message: format!("trial {index} timed out"),
                category: ErrorCategory::Timeout,
            });
            trials.push(trial);
        }
        let summary = ErrorSummary::from_trials(&trials);
        assert_eq!(summary.detailed.len(), 10);
        assert_eq!(summary.overflow_count, 2);
        assert_eq!(summary.counts_by_category[&ErrorCategory::Timeout], 12);
    }

    fn sample_trial() -> TrialResult {
        TrialResult {
            trial_number: 0,
            scenario_id: "scenario-1".to_string(),
            model: ModelId::new("anthropic:claude"),
            execution: ExecutionOutcome {
                success: true,
                duration_ms: 10,
                finish_reason: "stop".to_string(),
                error: None,
            },
            usage: UsageStats::default(),
            tool_calls: ToolCallSummary::from_traces(vec![]),
            output: OutputResult::default(),
            artifacts: ArtifactResult::default(),
            goals: None,
        }
    }
}
