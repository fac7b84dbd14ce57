use std::collections::HashMap;
use std::sync::Mutex;

use agentuse_core::time_utils::SharedClock;
use agentuse_core::ids::MonotonicIdSource;
use agentuse_model::{GoalMetrics, GoalStatus, GoalToolCall, TrackedGoal};

use crate::tools::{COMPLETE_GOAL_TOOL, DECLARE_GOAL_TOOL};

/// Single-owner actor tracking one trial's LLM-declared goals.
///
/// `declareGoal`/`completeGoal` run live, as the side effect of the two
/// goal-tracking tools the trial runner injects into the turn loop.
/// `process_traces` runs once, after the loop ends, to associate every
/// other tool call in the trial's trace timeline with whichever goal was
/// active when it happened; it never re-runs declare or complete, it only
/// replays the name pointer those events already left behind.
#[derive(Debug, Default)]
pub struct GoalTracker {
    ids: MonotonicIdSource,
    state: Mutex<GoalTrackerState>,
}

#[derive(Debug, Default)]
struct GoalTrackerState {
    goals: Vec<TrackedGoal>,
    index_by_name: HashMap<String, usize>,
    active_name: Option<String>,
}

impl GoalTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a new goal. If one is already active (any name), it is
    /// marked abandoned first. If a goal with this same name was declared
    /// before, its stored entry is overwritten in place.
    pub fn declare_goal(&self, clock: &SharedClock, name: &str, description: Option<String>) {
        let now = clock.now_unix_ms();
        let mut state = lock_or_recover(&self.state);

        if let Some(active_name) = state.active_name.clone() {
            abandon(&mut state, &active_name, now);
        }

        let goal = TrackedGoal {
            id: self.ids.next_id("goal"),
            name: name.to_string(),
            description,
            start_time_unix_ms: now,
            end_time_unix_ms: None,
            status: GoalStatus::Active,
            tool_calls: Vec::new(),
        };

        match state.index_by_name.get(name).copied() {
            Some(index) => state.goals[index] = goal,
            None => {
                let index = state.goals.len();
                state.goals.push(goal);
                state.index_by_name.insert(name.to_string(), index);
            }
        }
        state.active_name = Some(name.to_string());
    }

    /// Completes the named goal as succeeded or failed. A name with no
    /// matching declaration is created retroactively, so a `completeGoal`
    /// call for a goal the tracker never saw declared is still accounted
    /// for rather than silently dropped.
    pub fn complete_goal(&self, clock: &SharedClock, name: &str, success: bool) {
        let now = clock.now_unix_ms();
        let mut state = lock_or_recover(&self.state);
        let index = match state.index_by_name.get(name).copied() {
            Some(index) => index,
            None => {
                let goal = TrackedGoal {
                    id: self.ids.next_id("goal"),
                    name: name.to_string(),
                    description: None,
                    start_time_unix_ms: now,
                    end_time_unix_ms: None,
                    status: GoalStatus::Active,
                    tool_calls: Vec::new(),
                };
                let index = state.goals.len();
                state.goals.push(goal);
                state.index_by_name.insert(name.to_string(), index);
                index
            }
        };
        let goal = &mut state.goals[index];
        goal.status = if success {
            GoalStatus::Completed
        } else {
            GoalStatus::Failed
        };
        goal.end_time_unix_ms = Some(now);
        if state.active_name.as_deref() == Some(name) {
            state.active_name = None;
        }
    }

    /// Records a tool call against whichever goal is active right now.
    /// A call with no active goal is dropped: it happened outside any
    /// declared sub-task and contributes to no goal's metrics.
    pub fn record_tool_call(&self, tool_name: &str, success: bool, duration_ms: u64) {
        let mut state = lock_or_recover(&self.state);
        let Some(active_name) = state.active_name.clone() else {
            return;
        };
        let Some(&index) = state.index_by_name.get(&active_name) else {
            return;
        };
        state.goals[index].tool_calls.push(GoalToolCall {
            tool_name: tool_name.to_string(),
            success,
            duration_ms,
        });
    }

    /// Reconciles a trial's full, ordered trace list with the goals
    /// already declared/completed live during execution. Walks the
    /// traces in order, tracking its own current-goal pointer seeded by
    /// the `declare_goal`/`complete_goal` tool traces, and attributes
    /// every other tool-typed trace to whichever goal is current at that
    /// point. Any goal still active once the walk ends is abandoned.
    pub fn process_traces(&self, clock: &SharedClock, traces: &[agentuse_model::ToolCallTrace]) {
        let mut current: Option<String> = None;
        for trace in traces {
            if !trace.is_tool_call() {
                continue;
            }
            match trace.name() {
                DECLARE_GOAL_TOOL => {
                    if let Some(name) = declared_goal_name(trace) {
                        current = Some(name);
                    }
                }
                COMPLETE_GOAL_TOOL => {
                    current = None;
                }
                other => {
                    if current.is_some() {
                        let success = trace.succeeded().unwrap_or(false);
                        self.attribute(other, success, trace.duration_ms(), current.as_deref());
                    }
                }
            }
        }

        let now = clock.now_unix_ms();
        let mut state = lock_or_recover(&self.state);
        let active_names: Vec<String> = state
            .goals
            .iter()
            .filter(|goal| goal.status == GoalStatus::Active)
            .map(|goal| goal.name.clone())
            .collect();
        for name in active_names {
            abandon(&mut state, &name, now);
        }
    }

    fn attribute(&self, tool_name: &str, success: bool, duration_ms: u64, active_name: Option<&str>) {
        let Some(active_name) = active_name else {
            return;
        };
        let mut state = lock_or_recover(&self.state);
        let Some(&index) = state.index_by_name.get(active_name) else {
            return;
        };
        state.goals[index].tool_calls.push(GoalToolCall {
            tool_name: tool_name.to_string(),
            success,
            duration_ms,
        });
    }

    /// A snapshot of every goal tracked this trial, in declaration order.
    pub fn goals(&self) -> Vec<TrackedGoal> {
        lock_or_recover(&self.state).goals.clone()
    }

    pub fn metrics(&self) -> GoalMetrics {
        GoalMetrics::from_goals(&self.goals())
    }
}

fn declared_goal_name(trace: &agentuse_model::ToolCallTrace) -> Option<String> {
    if let agentuse_model::ToolCallTrace::Tool {
        input: Some(input), ..
    } = trace
    {
        input.get("name")?.as_str().map(|name| name.to_string())
    } else {
        None
    }
}

fn abandon(state: &mut GoalTrackerState, name: &str, now: u64) {
    let Some(&index) = state.index_by_name.get(name) else {
        return;
    };
    let goal = &mut state.goals[index];
    if goal.status.is_terminal() {
        return;
    }
    goal.status = GoalStatus::Abandoned;
    goal.end_time_unix_ms = Some(now);
    if state.active_name.as_deref() == Some(name) {
        state.active_name = None;
    }
}

fn lock_or_recover<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentuse_core::time_utils::FixedClock;
    use std::sync::Arc;

    fn clock(start_ms: u64) -> SharedClock {
        Arc::new(FixedClock::ticking_from(start_ms, 10))
    }

    #[test]
    fn declaring_a_second_goal_abandons_the_first() {
        let tracker = GoalTracker::new();
        let clock = clock(0);
        tracker.declare_goal(&clock, "first", None);
        tracker.declare_goal(&clock, "second", None);
        let goals = tracker.goals();
        assert_eq!(goals.len(), 2);
        assert_eq!(goals[0].status, GoalStatus::Abandoned);
        assert_eq!(goals[1].status, GoalStatus::Active);
    }

    #[test]
    fn redeclaring_the_same_name_overwrites_the_prior_entry_in_place() {
        let tracker = GoalTracker::new();
        let clock = clock(0);
        tracker.declare_goal(&clock, "build", Some("first attempt".to_string()));
        tracker.record_tool_call("search", true, 5);
        tracker.declare_goal(&clock, "build", Some("second attempt".to_string()));
        let goals = tracker.goals();
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].description.as_deref(), Some("second attempt"));
        assert!(goals[0].tool_calls.is_empty());
    }

    #[test]
    fn completing_an_undeclared_goal_name_creates_it_retroactively() {
        let tracker = GoalTracker::new();
        let clock = clock(0);
        tracker.complete_goal(&clock, "never-declared", true);
        let goals = tracker.goals();
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].status, GoalStatus::Completed);
    }

    #[test]
    fn process_traces_attributes_tool_calls_between_declare_and_complete() {
        let tracker = GoalTracker::new();
        let clock = clock(0);
        tracker.declare_goal(&clock, "build-feature", None);

        let traces = vec![
            agentuse_model::ToolCallTrace::Tool {
                name: DECLARE_GOAL_TOOL.to_string(),
                duration_ms: 1,
                input: Some(serde_json::json!({"name": "build-feature"})),
                success: Some(true),
            },
            agentuse_model::ToolCallTrace::Tool {
                name: "write_file".to_string(),
                duration_ms: 20,
                input: None,
                success: Some(false),
            },
            agentuse_model::ToolCallTrace::Tool {
                name: "write_file".to_string(),
                duration_ms: 15,
                input: None,
                success: Some(true),
            },
            agentuse_model::ToolCallTrace::Tool {
                name: COMPLETE_GOAL_TOOL.to_string(),
                duration_ms: 1,
                input: Some(serde_json::json!({"name": "build-feature", "success": true})),
                success: Some(true),
            },
        ];
        tracker.complete_goal(&clock, "build-feature", true);
        tracker.process_traces(&clock, &traces);

        let goals = tracker.goals();
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].tool_calls.len(), 2);
        assert_eq!(goals[0].status, GoalStatus::Completed);
    }

    #[test]
    fn a_goal_still_active_at_trial_end_is_abandoned() {
        let tracker = GoalTracker::new();
        let clock = clock(0);
        tracker.declare_goal(&clock, "unfinished", None);
        tracker.process_traces(&clock, &[]);
        let goals = tracker.goals();
        assert_eq!(goals[0].status, GoalStatus::Abandoned);
        assert!(goals[0].end_time_unix_ms.is_some());
    }
}
