use serde_json::{json, Value};

/// Name the turn loop matches on to route a tool call to the goal tracker
/// rather than an agent-declared or MCP tool.
pub const DECLARE_GOAL_TOOL: &str = "benchmark__declare_goal";
pub const COMPLETE_GOAL_TOOL: &str = "benchmark__complete_goal";

/// Tool definitions for the two goal-tracking tools injected into every
/// trial's turn loop, in the wire shape an LLM client's tool list expects
/// (name, description, JSON Schema parameters).
pub fn goal_tracking_tool_definitions() -> Vec<Value> {
    vec![
        json!({
            "name": DECLARE_GOAL_TOOL,
            "description": "Declare a sub-task you are about to work on. Call this before starting any multi-step piece of work so progress toward it can be tracked.",
            "parameters": {
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "A short, stable identifier for this goal." },
                    "description": { "type": "string", "description": "Optional longer description of what the goal entails." }
                },
                "required": ["name"]
            }
        }),
        json!({
            "name": COMPLETE_GOAL_TOOL,
            "description": "Mark a previously declared goal as finished.",
            "parameters": {
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "The goal name passed to declare_goal." },
                    "success": { "type": "boolean", "description": "Whether the goal was achieved." }
                },
                "required": ["name", "success"]
            }
        }),
    ]
}
