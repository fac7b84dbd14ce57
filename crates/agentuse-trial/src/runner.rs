use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};

use agentuse_core::time_utils::SharedClock;
use agentuse_eval::evaluate;
use agentuse_goals::tools::{goal_tracking_tool_definitions, COMPLETE_GOAL_TOOL, DECLARE_GOAL_TOOL};
use agentuse_goals::tracker::GoalTracker;
use agentuse_llm::{
    ChatRequest, ContentBlock, LlmClient, Message, MessageRole, ToolChoice, ToolDefinition,
};
use agentuse_mcp::{McpServerHandle, McpServerSpec as McpSpawnSpec};
use agentuse_model::{
    ArtifactResult, ErrorCategory, ExecutionOutcome, ModelId, OutputResult, Scenario,
    ToolCallSummary, ToolCallTrace, TrialError, TrialGoals, TrialResult, UsageStats,
};
use agentuse_suite::substitute_dynamic_variables;
use tokio::select;

use crate::cancellation::CooperativeCancellationToken;
use crate::context::{bounded_messages, final_assistant_text, system_messages};
use crate::scratch::ScratchDir;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
const DEFAULT_MAX_STEPS: u32 = 20;
const MAX_CONTEXT_MESSAGES: usize = 64;

/// Everything the Trial Runner needs to execute one
/// `(agent, scenario, trialNumber, model)` tuple.
pub struct TrialRequest<'a> {
    pub agent: &'a agentuse_model::AgentConfig,
    pub agent_mcp_servers: &'a [agentuse_model::McpServerSpec],
    pub scenario: &'a Scenario,
    pub model: &'a ModelId,
    pub trial_number: u32,
    pub suite_dir: &'a Path,
    pub output_dir: &'a Path,
    pub timeout: Option<Duration>,
    pub max_steps: Option<u32>,
}

pub struct TrialDeps<'a> {
    pub llm: &'a dyn LlmClient,
    pub judge: &'a dyn LlmClient,
    pub clock: &'a SharedClock,
}

/// Runs one trial end to end. Never returns an `Err`: every failure path
/// is folded into a `TrialResult` with `execution.success=false` and the
/// appropriate [`ErrorCategory`], per the Trial Runner's never-throws
/// contract.
pub async fn run_trial(request: TrialRequest<'_>, deps: TrialDeps<'_>) -> TrialResult {
    let started_at = Instant::now();
    let timeout = request.timeout.unwrap_or(DEFAULT_TIMEOUT);
    let max_steps = request.max_steps.or(request.agent.max_steps).unwrap_or(DEFAULT_MAX_STEPS);

    let input = substitute_dynamic_variables(&request.scenario.input, deps.clock);

    let scratch = match ScratchDir::create(request.output_dir, &request.scenario.id, request.trial_number) {
        Ok(scratch) => scratch,
        Err(error) => {
            return failed_trial(
                &request,
                started_at,
                "runtime_error",
                ErrorCategory::RuntimeError,
                format!("failed to create scratch directory: {error}"),
            )
        }
    };

    let (token, deadline_handle) = CooperativeCancellationToken::with_deadline(timeout);

    let mcp_specs: Vec<McpSpawnSpec> = request
        .agent_mcp_servers
        .iter()
        .map(|spec| McpSpawnSpec {
            name: spec.name.clone(),
            command: spec.command.clone(),
            args: spec.args.clone(),
            env: spec.env.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        })
        .collect();

    let ids = agentuse_core::ids::MonotonicIdSource::default();
    let mcp_handles = match agentuse_mcp::spawn_all(&mcp_specs, request.suite_dir, &ids).await {
        Ok(handles) => handles,
        Err(error) => {
            deadline_handle.abort();
            return failed_trial(
                &request,
                started_at,
                "runtime_error",
                ErrorCategory::RuntimeError,
                format!("failed to start mcp servers: {error}"),
            );
        }
    };

    let goal_tracker = GoalTracker::new();
    let outcome = drive_turn_loop(&request, &deps, &token, mcp_handles, &goal_tracker, input, max_steps).await;
    deadline_handle.abort();

    let TurnLoopOutcome {
        traces,
        usage,
        finish_reason,
        error,
        final_text,
    } = outcome;

    goal_tracker.process_traces(deps.clock, &traces);
    let goals = TrialGoals {
        tracked: goal_tracker.goals(),
        metrics: goal_tracker.metrics(),
    };

    let (output, artifacts) = match &request.scenario.expected {
        Some(expected) => {
            evaluate(
                expected.output.as_ref(),
                &expected.artifacts,
                &final_text,
                scratch.path(),
                deps.judge,
            )
            .await
        }
        None => (
            OutputResult {
                text: final_text.clone(),
                valid: true,
                validation_details: Vec::new(),
            },
            ArtifactResult::default(),
        ),
    };
    scratch.cleanup();

    let success = error.is_none();
    let duration_ms = started_at.elapsed().as_millis() as u64;
    let execution_error = error.map(|(error_type, message, category)| TrialError {
        error_type,
        message,
        category,
    });

    TrialResult {
        trial_number: request.trial_number,
        scenario_id: request.scenario.id.clone(),
        model: request.model.clone(),
        execution: ExecutionOutcome {
            success,
            duration_ms,
            finish_reason,
            error: execution_error,
        },
        usage,
        tool_calls: ToolCallSummary::from_traces(traces),
        output,
        artifacts,
        goals: Some(goals),
    }
}

struct TurnLoopOutcome {
    traces: Vec<ToolCallTrace>,
    usage: UsageStats,
    finish_reason: String,
    error: Option<(String, String, ErrorCategory)>,
    final_text: String,
}

async fn drive_turn_loop(
    request: &TrialRequest<'_>,
    deps: &TrialDeps<'_>,
    token: &CooperativeCancellationToken,
    mut mcp_handles: Vec<McpServerHandle>,
    goal_tracker: &GoalTracker,
    input: String,
    max_steps: u32,
) -> TurnLoopOutcome {
    let mut messages = system_messages(&request.agent.instructions);
    messages.push(Message::user(input));

    let mut tools: Vec<ToolDefinition> = goal_tracking_tool_definitions()
        .into_iter()
        .filter_map(value_to_tool_definition)
        .collect();
    let mcp_tool_owners = discover_mcp_tools(&mut mcp_handles, &mut tools, token).await;

    let mut traces = Vec::new();
    let mut usage = UsageStats::default();
    let mut steps = 0u32;
    let mut outcome_error = None;
    let mut finish_reason = "stop".to_string();

    loop {
        if token.is_cancelled() {
            finish_reason = "timeout".to_string();
            outcome_error = Some((
                "timeout".to_string(),
                format!("trial exceeded its deadline after {steps} turn(s)"),
                ErrorCategory::Timeout,
            ));
            break;
        }
        if steps >= max_steps {
            finish_reason = "max_steps".to_string();
            break;
        }
        steps += 1;

        let request_body = ChatRequest {
            model: request.agent.model.clone(),
            messages: bounded_messages(&messages, MAX_CONTEXT_MESSAGES),
            tools: tools.clone(),
            tool_choice: Some(ToolChoice::Auto),
            json_mode: false,
            max_tokens: None,
            temperature: None,
        };

        let llm_started = Instant::now();
        let response = select! {
            response = deps.llm.complete(request_body) => response,
            _ = token.cancelled() => {
                finish_reason = "timeout".to_string();
                outcome_error = Some((
                    "timeout".to_string(),
                    "trial exceeded its deadline awaiting a model response".to_string(),
                    ErrorCategory::Timeout,
                ));
                break;
            }
        };
        let llm_duration_ms = llm_started.elapsed().as_millis() as u64;

        let response = match response {
            Ok(response) => response,
            Err(error) => {
                finish_reason = "error".to_string();
                outcome_error = Some(("llm_error".to_string(), error.to_string(), ErrorCategory::RuntimeError));
                break;
            }
        };

        usage.input_tokens += response.usage.input_tokens;
        usage.output_tokens += response.usage.output_tokens;
        usage.total_tokens += response.usage.total_tokens;
        traces.push(ToolCallTrace::Llm {
            name: "assistant-turn".to_string(),
            duration_ms: llm_duration_ms,
            tokens: Some(UsageStats {
                input_tokens: response.usage.input_tokens,
                output_tokens: response.usage.output_tokens,
                total_tokens: response.usage.total_tokens,
                estimated_cost_usd: None,
            }),
        });

        let tool_calls = response.message.tool_calls();
        messages.push(response.message.clone());

        if tool_calls.is_empty() {
            finish_reason = response.finish_reason.clone().unwrap_or_else(|| "stop".to_string());
            break;
        }

        for call in tool_calls {
            let tool_started = Instant::now();
            let (result_text, success) = match call.name.as_str() {
                DECLARE_GOAL_TOOL => {
                    let name = call.arguments.get("name").and_then(|v| v.as_str()).unwrap_or_default();
                    let description = call
                        .arguments
                        .get("description")
                        .and_then(|v| v.as_str())
                        .map(|s| s.to_string());
                    goal_tracker.declare_goal(deps.clock, name, description);
                    ("{\"success\":true}".to_string(), true)
                }
                COMPLETE_GOAL_TOOL => {
                    let name = call.arguments.get("name").and_then(|v| v.as_str()).unwrap_or_default();
                    let goal_success = call
                        .arguments
                        .get("success")
                        .and_then(|v| v.as_bool())
                        .unwrap_or(false);
                    goal_tracker.complete_goal(deps.clock, name, goal_success);
                    ("{\"success\":true}".to_string(), true)
                }
                name => match mcp_tool_owners.get(name) {
                    Some((server_index, remote_name)) => {
                        let handle = &mut mcp_handles[*server_index];
                        match handle
                            .call(
                                "tools/call",
                                serde_json::json!({"name": remote_name, "arguments": call.arguments}),
                            )
                            .await
                        {
                            Ok(value) => (value.to_string(), true),
                            Err(error) => (error.to_string(), false),
                        }
                    }
                    None => (format!("unknown tool '{name}'"), false),
                },
            };
            let duration_ms = tool_started.elapsed().as_millis() as u64;
            traces.push(ToolCallTrace::Tool {
                name: call.name.clone(),
                duration_ms,
                input: Some(call.arguments.clone()),
                success: Some(success),
            });
            messages.push(Message::tool_result(call.id.clone(), call.name.clone(), result_text, !success));
        }
    }

    for handle in mcp_handles {
        let _ = handle.shutdown().await;
    }

    TurnLoopOutcome {
        final_text: final_assistant_text(&messages),
        traces,
        usage,
        finish_reason,
        error: outcome_error,
    }
}

async fn discover_mcp_tools(
    handles: &mut [McpServerHandle],
    tools: &mut Vec<ToolDefinition>,
    token: &CooperativeCancellationToken,
) -> HashMap<String, (usize, String)> {
    let mut owners = HashMap::new();
    for (index, handle) in handles.iter_mut().enumerate() {
        if token.is_cancelled() {
            break;
        }
        let Ok(response) = handle.call("tools/list", serde_json::Value::Null).await else {
            continue;
        };
        let Some(listed) = response.get("tools").and_then(|v| v.as_array()) else {
            continue;
        };
        for tool in listed {
            let Some(remote_name) = tool.get("name").and_then(|v| v.as_str()) else {
                continue;
            };
            let qualified_name = format!("{}__{}", handle.name(), remote_name);
            let description = tool
                .get("description")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let parameters = tool
                .get("inputSchema")
                .cloned()
                .unwrap_or_else(|| serde_json::json!({"type": "object"}));
            tools.push(ToolDefinition {
                name: qualified_name.clone(),
                description,
                parameters,
            });
            owners.insert(qualified_name, (index, remote_name.to_string()));
        }
    }
    owners
}

fn value_to_tool_definition(value: serde_json::Value) -> Option<ToolDefinition> {
    Some(ToolDefinition {
        name: value.get("name")?.as_str()?.to_string(),
        description: value.get("description")?.as_str()?.to_string(),
        parameters: value.get("parameters")?.clone(),
    })
}

fn failed_trial(
    request: &TrialRequest<'_>,
    started_at: Instant,
    finish_reason: &str,
    category: ErrorCategory,
    message: String,
) -> TrialResult {
    TrialResult {
        trial_number: request.trial_number,
        scenario_id: request.scenario.id.clone(),
        model: request.model.clone(),
        execution: ExecutionOutcome {
            success: false,
            duration_ms: started_at.elapsed().as_millis() as u64,
            finish_reason: finish_reason.to_string(),
            error: Some(TrialError {
                error_type: finish_reason.to_string(),
                message,
                category,
            }),
        },
        usage: UsageStats::default(),
        tool_calls: ToolCallSummary::from_traces(Vec::new()),
        output: OutputResult::default(),
        artifacts: ArtifactResult::default(),
        goals: None,
    }
}
