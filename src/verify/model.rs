use serde::{Deserialize, Serialize};

/// A task result as presented to the verifier: id, what the task was
/// asked to do, and what came back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResultView {
    pub id: String,
    pub description: String,
    pub result: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskVerification {
    pub task_id: String,
    pub is_correct: bool,

    #[serde(default)]
    pub reasoning: String,

    #[serde(default)]
    pub confidence: f64,

    #[serde(default)]
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub overall_correct: bool,
    pub confidence: f64,

    #[serde(default)]
    pub task_verifications: Vec<TaskVerification>,

    #[serde(default)]
    pub final_answer: String,

    #[serde(default)]
    pub reasoning: String,

    #[serde(default)]
    pub recommendations: Vec<String>,
}
