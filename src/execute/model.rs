use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outputs of prerequisite tasks, keyed by task id. Resolved and
/// supplied by the caller; the executor only reads them.
pub type DependencyResults = HashMap<String, Value>;

/// A decoded tool invocation as it was routed to the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    pub arguments: Value,
}

/// One tool call and its outcome. Failures are data: an errored call is
/// recorded as `{"error": message}` and never aborts the task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub call: ToolInvocation,
    pub result: Value,
}

impl ToolCallRecord {
    pub fn is_error(&self) -> bool {
        self.result.get("error").is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub task_id: String,
    pub result: String,
    pub tool_calls: Vec<ToolCallRecord>,
    pub success: bool,
    pub reasoning: String,
    pub finished_at: DateTime<Utc>,
}
