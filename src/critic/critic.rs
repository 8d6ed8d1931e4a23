//! Final-answer rendering and presentation assessment.
//!
//! The model's free text IS the answer here; there is no JSON contract.
//! Structure, tone, completeness and improvement suggestions are derived
//! deterministically afterwards.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    critic::model::{CriticOutput, Presentation},
    error::Result,
    execute::ExecutionResult,
    model::{ChatMessage, ModelClient, SamplingParams},
    prompt::builder::{CRITIC_SYSTEM_PROMPT, build_critic_prompt},
    verify::VerificationReport,
};

const CAUTIOUS_CONFIDENCE: f64 = 70.0;
const IMPROVEMENT_CONFIDENCE: f64 = 80.0;
const IMPROVEMENT_COMPLETENESS: u32 = 80;

pub struct Critic {
    model: Arc<dyn ModelClient>,
}

impl Critic {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }

    /// Render the verified results into presentable prose. A failing
    /// model call (other than a provider signal) degrades to the
    /// verifier's own final answer.
    pub async fn format(
        &self,
        query: &str,
        verification: &VerificationReport,
        raw_results: Option<&[ExecutionResult]>,
        params: &SamplingParams,
    ) -> Result<CriticOutput> {
        let messages = vec![
            ChatMessage::system(CRITIC_SYSTEM_PROMPT),
            ChatMessage::user(&build_critic_prompt(query, verification, raw_results)),
        ];

        let final_answer = match self.model.chat(&messages, &[], params).await {
            Ok(response) if !response.text().trim().is_empty() => response.text().to_string(),
            Ok(_) => verification.final_answer.clone(),
            Err(e) if e.is_provider_signal() => return Err(e),
            Err(e) => {
                warn!(error = %e, "critic model call failed, using verifier's answer");
                verification.final_answer.clone()
            }
        };

        let presentation = assess_presentation(&final_answer, verification.confidence);
        let improvements = suggest_improvements(&final_answer, verification.confidence, &presentation);

        info!(
            structure = %presentation.structure,
            tone = %presentation.tone,
            completeness = presentation.completeness,
            "answer formatted"
        );
        Ok(CriticOutput {
            final_answer,
            confidence: verification.confidence,
            presentation,
            improvements,
        })
    }
}

pub fn assess_presentation(answer: &str, confidence: f64) -> Presentation {
    Presentation {
        structure: infer_structure(answer).to_string(),
        tone: infer_tone(answer, confidence).to_string(),
        completeness: score_completeness(answer),
    }
}

fn infer_structure(answer: &str) -> &'static str {
    let has_headings = answer.lines().any(|l| l.trim_start().starts_with('#'));
    if has_headings {
        return "sectioned";
    }
    let has_lists = answer.lines().any(|l| {
        let t = l.trim_start();
        t.starts_with("- ")
            || t.starts_with("* ")
            || t.chars().next().is_some_and(|c| c.is_ascii_digit()) && t.contains(". ")
    });
    if has_lists {
        return "bulleted";
    }
    if answer.split("\n\n").filter(|p| !p.trim().is_empty()).count() > 1 {
        return "multi-paragraph";
    }
    "paragraph"
}

fn infer_tone(answer: &str, confidence: f64) -> &'static str {
    let lower = answer.to_lowercase();
    if lower.contains("sorry") || lower.contains("apolog") || lower.contains("unfortunately") {
        return "apologetic";
    }
    if lower.contains("great news") || lower.contains("excellent") || lower.contains("exciting") {
        return "enthusiastic";
    }
    if confidence < CAUTIOUS_CONFIDENCE
        || lower.contains("however, note")
        || lower.contains("keep in mind")
    {
        return "cautious";
    }
    "professional"
}

/// Additive rubric: base 70, +10 for >50 words, +10 for >100 words,
/// +5 for formatting markers, +5 for paragraph breaks, capped at 100.
fn score_completeness(answer: &str) -> u32 {
    let words = answer.split_whitespace().count();
    let mut score: u32 = 70;
    if words > 50 {
        score += 10;
    }
    if words > 100 {
        score += 10;
    }
    if has_formatting(answer) {
        score += 5;
    }
    if answer.contains("\n\n") {
        score += 5;
    }
    score.min(100)
}

fn has_formatting(answer: &str) -> bool {
    answer.lines().any(|l| {
        let t = l.trim_start();
        t.starts_with('#') || t.starts_with("- ") || t.starts_with("* ") || t.starts_with("```")
    })
}

fn suggest_improvements(
    answer: &str,
    confidence: f64,
    presentation: &Presentation,
) -> Vec<String> {
    let mut improvements = Vec::new();
    if confidence < IMPROVEMENT_CONFIDENCE {
        improvements.push(
            "Gather more information or rerun low-confidence tasks to raise confidence"
                .to_string(),
        );
    }
    if presentation.completeness < IMPROVEMENT_COMPLETENESS {
        improvements.push("Expand the answer to cover the query more completely".to_string());
    }
    let words = answer.split_whitespace().count();
    if words > 100 && !has_formatting(answer) && !answer.contains("\n\n") {
        improvements.push("Break the long answer up with headings or lists".to_string());
    }
    improvements
}
