use serde::{Deserialize, Serialize};

/// One node of the task graph. `dependencies` name other task ids in
/// the same plan; `tools` name entries of the discovery catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,

    pub description: String,

    #[serde(default)]
    pub dependencies: Vec<String>,

    #[serde(default)]
    pub tools: Vec<String>,

    #[serde(default)]
    pub reasoning: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub tasks: Vec<Task>,

    #[serde(default)]
    pub total_steps: usize,

    #[serde(default)]
    pub reasoning: String,
}

impl Plan {
    /// Deterministic degraded plan used when the model's output cannot
    /// be parsed: one task, no tools, no dependencies.
    pub fn fallback(query: &str) -> Self {
        Self {
            tasks: vec![Task {
                id: "task_1".to_string(),
                description: format!("Answer the query directly: {query}"),
                dependencies: Vec::new(),
                tools: Vec::new(),
                reasoning: "Fallback plan after unparseable planner output".to_string(),
            }],
            total_steps: 1,
            reasoning: "Planner output could not be parsed; answering in a single step"
                .to_string(),
        }
    }
}
