mod common;

use std::sync::Arc;

use conductor::{
    Critic, Error,
    critic::critic::assess_presentation,
    model::SamplingParams,
    verify::{TaskVerification, VerificationReport},
};

use common::{ScriptedModel, text_response};

fn report(confidence: f64) -> VerificationReport {
    VerificationReport {
        overall_correct: true,
        confidence,
        task_verifications: vec![TaskVerification {
            task_id: "task_1".to_string(),
            is_correct: true,
            reasoning: String::new(),
            confidence,
            issues: Vec::new(),
        }],
        final_answer: "Draft answer from verification.".to_string(),
        reasoning: String::new(),
        recommendations: Vec::new(),
    }
}

#[tokio::test]
async fn free_text_becomes_the_final_answer() {
    let critic = Critic::new(Arc::new(ScriptedModel::new(vec![text_response(
        "The weather in Tokyo is sunny and 21C.",
    )])));

    let output = critic
        .format("Weather in Tokyo", &report(90.0), None, &SamplingParams::default())
        .await
        .unwrap();

    assert_eq!(output.final_answer, "The weather in Tokyo is sunny and 21C.");
    assert_eq!(output.confidence, 90.0);
    assert_eq!(output.presentation.tone, "professional");
    assert_eq!(output.presentation.structure, "paragraph");
}

#[tokio::test]
async fn low_confidence_answers_read_cautious_with_improvements() {
    let critic = Critic::new(Arc::new(ScriptedModel::new(vec![text_response(
        "Tokyo is probably sunny right now.",
    )])));

    let output = critic
        .format("Weather in Tokyo", &report(40.0), None, &SamplingParams::default())
        .await
        .unwrap();

    assert_eq!(output.presentation.tone, "cautious");
    assert!(
        output
            .improvements
            .iter()
            .any(|s| s.to_lowercase().contains("more information")),
        "expected a gather-more-information suggestion, got {:?}",
        output.improvements
    );
}

#[tokio::test]
async fn model_failure_degrades_to_the_verified_answer() {
    let critic = Critic::new(Arc::new(ScriptedModel::new(vec![Err(Error::Model(
        "boom".to_string(),
    ))])));

    let output = critic
        .format("query", &report(90.0), None, &SamplingParams::default())
        .await
        .unwrap();
    assert_eq!(output.final_answer, "Draft answer from verification.");
}

#[tokio::test]
async fn auth_rejection_still_propagates() {
    let critic = Critic::new(Arc::new(ScriptedModel::new(vec![Err(Error::AuthRejected(
        "401".to_string(),
    ))])));

    let err = critic
        .format("query", &report(90.0), None, &SamplingParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AuthRejected(_)));
}

#[test]
fn structure_inference() {
    assert_eq!(assess_presentation("# Title\nbody", 90.0).structure, "sectioned");
    assert_eq!(assess_presentation("- one\n- two", 90.0).structure, "bulleted");
    assert_eq!(
        assess_presentation("First paragraph.\n\nSecond paragraph.", 90.0).structure,
        "multi-paragraph"
    );
    assert_eq!(assess_presentation("Just one line.", 90.0).structure, "paragraph");
}

#[test]
fn tone_inference() {
    assert_eq!(
        assess_presentation("Sorry, I could not find that.", 90.0).tone,
        "apologetic"
    );
    assert_eq!(
        assess_presentation("Excellent results all around.", 90.0).tone,
        "enthusiastic"
    );
    assert_eq!(assess_presentation("Plain statement.", 60.0).tone, "cautious");
    assert_eq!(assess_presentation("Plain statement.", 90.0).tone, "professional");
}

#[test]
fn completeness_follows_the_additive_rubric() {
    // Base 70: short, unformatted, single block.
    assert_eq!(assess_presentation("tiny answer", 90.0).completeness, 70);

    // 51 words -> +10.
    let medium = vec!["word"; 51].join(" ");
    assert_eq!(assess_presentation(&medium, 90.0).completeness, 80);

    // 101 words -> +20.
    let long = vec!["word"; 101].join(" ");
    assert_eq!(assess_presentation(&long, 90.0).completeness, 90);

    // Formatting and paragraph breaks add 5 each, capped at 100.
    let rich = format!("# Heading\n\n{long}\n\n- point");
    assert_eq!(assess_presentation(&rich, 90.0).completeness, 100);
}
