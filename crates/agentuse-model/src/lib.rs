//! Shared data model for the AgentUse benchmark orchestration core: the
//! suite descriptor, trial results, goal tracking, and the aggregate
//! rollups the reporter renders.
//!
//! Tagged variants (tool-call trace kind, goal status, error category,
//! output validation kind) use Rust sum types with a serde `tag` rather
//! than ad hoc string fields, so invalid combinations are unrepresentable
//! at the type level even though the wire form is still a tagged JSON
//! object.

pub mod aggregate;
pub mod goals;
pub mod trial;
pub mod suite;
pub mod validation;

pub use aggregate::{
    AgentAggregate, AgentResult, LatencyStats, ModelAggregate, ModelResult, RankedModel,
    ScenarioAggregate, ScenarioResult, SuiteResult, TokenEfficiency, ToolMetric,
};
pub use goals::{GoalMetrics, GoalStatus, GoalToolCall, TrackedGoal};
pub use suite::{
    Agent, AgentConfig, Difficulty, McpServerSpec, ModelId, Scenario, ScenarioExpectation, Suite,
    SuiteConfig, Test, MODEL_PLACEHOLDER,
};
pub use trial::{
    ArtifactCheckDetail, ArtifactResult, ErrorCategory, ErrorDetail, ErrorSummary,
    ExecutionOutcome, OutputResult, ToolCallSummary, ToolCallTrace, TrialError, TrialGoals,
    TrialResult, UsageStats,
};
pub use validation::{ArtifactExpectation, OutputValidation};
