//! Correctness/consistency scoring of task results.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    error::{Error, Result},
    model::{ChatMessage, ModelClient, SamplingParams},
    prompt::builder::{VERIFIER_SYSTEM_PROMPT, build_verifier_prompt},
    utils::{StripCodeBlock, string_util::truncate_marked},
    verify::model::{TaskResultView, TaskVerification, VerificationReport},
};

/// Per-result size bound in the verification prompt; cuts are marked
/// inline so the model knows data was dropped.
pub const RESULT_TRUNCATION_LIMIT: usize = 1000;

const FALLBACK_CONFIDENCE: f64 = 60.0;
const ASSUMED_CONFIDENCE: f64 = 70.0;

pub struct Verifier {
    model: Arc<dyn ModelClient>,
}

impl Verifier {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }

    /// Score `task_results` against the original query. Model output is
    /// coerced defensively field by field; total parse failure degrades
    /// to a pass-through verdict, never an error.
    pub async fn verify(
        &self,
        query: &str,
        task_results: &[TaskResultView],
        params: &SamplingParams,
    ) -> Result<VerificationReport> {
        if query.trim().is_empty() {
            return Err(Error::Validation("query must not be empty".to_string()));
        }

        let bounded: Vec<TaskResultView> = task_results
            .iter()
            .map(|view| TaskResultView {
                id: view.id.clone(),
                description: view.description.clone(),
                result: truncate_marked(&view.result, RESULT_TRUNCATION_LIMIT),
            })
            .collect();

        let messages = vec![
            ChatMessage::system(VERIFIER_SYSTEM_PROMPT),
            ChatMessage::user(&build_verifier_prompt(query, &bounded)),
        ];

        let report = match self.model.chat(&messages, &[], params).await {
            Ok(response) => match Self::parse_report(response.text(), task_results) {
                Some(report) => report,
                None => {
                    warn!("verifier output was not valid JSON, using pass-through verdict");
                    Self::fallback_report(task_results)
                }
            },
            Err(e) if e.is_provider_signal() => return Err(e),
            Err(e) => {
                warn!(error = %e, "verifier model call failed, using pass-through verdict");
                Self::fallback_report(task_results)
            }
        };

        info!(
            overall = report.overall_correct,
            confidence = report.confidence,
            "verification complete"
        );
        Ok(report)
    }

    fn parse_report(text: &str, task_results: &[TaskResultView]) -> Option<VerificationReport> {
        let stripped = text.strip_code_block();
        let mut report: VerificationReport = serde_json::from_str(stripped).ok()?;

        if report.task_verifications.is_empty() {
            // Assume correctness per input task rather than verifying
            // nothing at all.
            report.task_verifications = task_results
                .iter()
                .map(|view| TaskVerification {
                    task_id: view.id.clone(),
                    is_correct: true,
                    reasoning: "Assumed correct: verifier returned no per-task entries"
                        .to_string(),
                    confidence: ASSUMED_CONFIDENCE,
                    issues: Vec::new(),
                })
                .collect();
        }
        for verification in &mut report.task_verifications {
            verification.confidence = verification.confidence.clamp(0.0, 100.0);
        }

        // Never trusted from the model: the verdict is the AND of the
        // per-task flags, the confidence their mean.
        report.overall_correct = report.task_verifications.iter().all(|v| v.is_correct);
        report.confidence = mean_confidence(&report.task_verifications);

        Some(report)
    }

    fn fallback_report(task_results: &[TaskResultView]) -> VerificationReport {
        let final_answer = task_results
            .iter()
            .map(|view| view.result.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        VerificationReport {
            overall_correct: true,
            confidence: FALLBACK_CONFIDENCE,
            task_verifications: task_results
                .iter()
                .map(|view| TaskVerification {
                    task_id: view.id.clone(),
                    is_correct: true,
                    reasoning: "Unverified: verifier output unusable".to_string(),
                    confidence: FALLBACK_CONFIDENCE,
                    issues: Vec::new(),
                })
                .collect(),
            final_answer,
            reasoning: "Verifier output could not be parsed; passing results through".to_string(),
            recommendations: Vec::new(),
        }
    }
}

fn mean_confidence(verifications: &[TaskVerification]) -> f64 {
    if verifications.is_empty() {
        return 0.0;
    }
    verifications.iter().map(|v| v.confidence).sum::<f64>() / verifications.len() as f64
}
