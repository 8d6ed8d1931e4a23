use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Presentation {
    /// sectioned / bulleted / multi-paragraph / paragraph
    pub structure: String,
    /// apologetic / enthusiastic / cautious / professional
    pub tone: String,
    /// 0..=100
    pub completeness: u32,
}

/// Terminal artifact of the pipeline: the user-facing answer plus a
/// deterministic assessment of how it reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriticOutput {
    pub final_answer: String,
    pub confidence: f64,
    pub presentation: Presentation,
    pub improvements: Vec<String>,
}
