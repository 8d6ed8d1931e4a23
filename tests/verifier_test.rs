mod common;

use std::sync::Arc;

use conductor::{
    Error, Verifier,
    model::SamplingParams,
    verify::TaskResultView,
};
use serde_json::json;

use common::{ScriptedModel, text_response};

fn views() -> Vec<TaskResultView> {
    vec![
        TaskResultView {
            id: "task_1".to_string(),
            description: "Look up the weather in Tokyo".to_string(),
            result: "Sunny, 21C".to_string(),
        },
        TaskResultView {
            id: "task_2".to_string(),
            description: "Convert 100 USD to EUR".to_string(),
            result: "85 EUR".to_string(),
        },
    ]
}

fn verifier(responses: Vec<conductor::Result<conductor::model::ModelResponse>>) -> Verifier {
    Verifier::new(Arc::new(ScriptedModel::new(responses)))
}

#[tokio::test]
async fn consistent_results_verify_with_mean_confidence() {
    let report_json = json!({
        "overallCorrect": true,
        "confidence": 10,
        "taskVerifications": [
            {"taskId": "task_1", "isCorrect": true, "reasoning": "plausible", "confidence": 90, "issues": []},
            {"taskId": "task_2", "isCorrect": true, "reasoning": "plausible", "confidence": 80, "issues": []}
        ],
        "finalAnswer": "Sunny and 21C in Tokyo; 100 USD is 85 EUR.",
        "reasoning": "Both results answer their half of the query",
        "recommendations": []
    });
    let verifier = verifier(vec![text_response(&report_json.to_string())]);

    let report = verifier
        .verify("Weather in Tokyo and convert 100 USD to EUR", &views(), &SamplingParams::default())
        .await
        .unwrap();

    assert!(report.overall_correct);
    // Mean of the per-task confidences, not the model's own number.
    assert_eq!(report.confidence, 85.0);
    assert_eq!(report.task_verifications.len(), 2);
}

#[tokio::test]
async fn overall_correct_is_recomputed_as_the_and() {
    let report_json = json!({
        "overallCorrect": true,
        "confidence": 95,
        "taskVerifications": [
            {"taskId": "task_1", "isCorrect": true, "reasoning": "", "confidence": 90, "issues": []},
            {"taskId": "task_2", "isCorrect": false, "reasoning": "wrong rate", "confidence": 40,
             "issues": ["conversion uses a stale exchange rate"]}
        ],
        "finalAnswer": "",
        "reasoning": "",
        "recommendations": []
    });
    let verifier = verifier(vec![text_response(&report_json.to_string())]);

    let report = verifier
        .verify("query", &views(), &SamplingParams::default())
        .await
        .unwrap();

    assert!(!report.overall_correct);
    assert!(!report.task_verifications[1].issues.is_empty());
    assert_eq!(report.confidence, 65.0);
}

#[tokio::test]
async fn confidences_are_clamped() {
    let report_json = json!({
        "overallCorrect": true,
        "confidence": 500,
        "taskVerifications": [
            {"taskId": "task_1", "isCorrect": true, "reasoning": "", "confidence": 150, "issues": []},
            {"taskId": "task_2", "isCorrect": true, "reasoning": "", "confidence": -20, "issues": []}
        ],
        "finalAnswer": "",
        "reasoning": "",
        "recommendations": []
    });
    let verifier = verifier(vec![text_response(&report_json.to_string())]);

    let report = verifier
        .verify("query", &views(), &SamplingParams::default())
        .await
        .unwrap();

    assert_eq!(report.task_verifications[0].confidence, 100.0);
    assert_eq!(report.task_verifications[1].confidence, 0.0);
    assert!(report.confidence >= 0.0 && report.confidence <= 100.0);
}

#[tokio::test]
async fn missing_task_verifications_default_to_assumed_correct() {
    let report_json = json!({
        "overallCorrect": true,
        "confidence": 90,
        "finalAnswer": "combined answer",
        "reasoning": "",
        "recommendations": []
    });
    let verifier = verifier(vec![text_response(&report_json.to_string())]);

    let report = verifier
        .verify("query", &views(), &SamplingParams::default())
        .await
        .unwrap();

    assert_eq!(report.task_verifications.len(), 2);
    assert!(report.task_verifications.iter().all(|v| v.is_correct));
    assert!(report.task_verifications.iter().all(|v| v.confidence == 70.0));
    assert_eq!(report.confidence, 70.0);
}

#[tokio::test]
async fn malformed_output_degrades_to_pass_through() {
    let verifier = verifier(vec![text_response("{\"overallCorrect\": tru")]);

    let report = verifier
        .verify("query", &views(), &SamplingParams::default())
        .await
        .unwrap();

    assert!(report.overall_correct);
    assert_eq!(report.confidence, 60.0);
    assert!(report.final_answer.contains("Sunny, 21C"));
    assert!(report.final_answer.contains("85 EUR"));
}

#[test]
fn verifier_prompt_lists_tasks_plainly() {
    use conductor::prompt::builder::build_verifier_prompt;

    let prompt = build_verifier_prompt("query", &views());
    assert!(prompt.contains("Task task_1 - Look up the weather in Tokyo"));
    assert!(prompt.contains("Task task_2 - Convert 100 USD to EUR"));
    assert!(!prompt.contains('\u{2014}'));
}

#[test]
fn prompt_results_are_truncated_with_marker() {
    use conductor::utils::string_util::truncate_marked;
    use conductor::verify::verifier::RESULT_TRUNCATION_LIMIT;

    let bounded = truncate_marked(&"x".repeat(5000), RESULT_TRUNCATION_LIMIT);
    assert!(bounded.ends_with("... [truncated]"));
    assert!(bounded.len() < 5000);

    let short = truncate_marked("short", RESULT_TRUNCATION_LIMIT);
    assert_eq!(short, "short");
}

#[tokio::test]
async fn empty_query_fails_fast() {
    let model = Arc::new(ScriptedModel::new(vec![]));
    let verifier = Verifier::new(model.clone());

    let err = verifier
        .verify("", &views(), &SamplingParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(model.remaining(), 0);
}
