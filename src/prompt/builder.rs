//! Prompt construction for every pipeline stage.

use crate::{
    execute::model::{DependencyResults, ExecutionResult},
    plan::Task,
    registry::ToolDescriptor,
    verify::model::{TaskResultView, VerificationReport},
};

pub const PLANNER_SYSTEM_PROMPT: &str = r#"
You are a task planning assistant.
Your only output must be valid JSON matching this structure:

{
  "reasoning": "why the query decomposes this way",
  "tasks": [
    {
      "id": "task_1",
      "description": "what this task does",
      "dependencies": ["ids of tasks whose output this task needs"],
      "tools": ["names of tools this task will use"],
      "reasoning": "why this task exists"
    }
  ],
  "totalSteps": 1
}

Rules:
- Reference ONLY tool names from the available tool list. Do not invent tools.
- Task ids must be unique. Dependencies must reference existing task ids.
- Prefer independent tasks with as few dependency edges as possible, so
  they can run in parallel.
- Never include notes, explanations, or markdown outside the JSON.
"#;

pub fn build_planner_prompt(query: &str, catalog: &[ToolDescriptor]) -> String {
    format!(
        "User query:\n{query}\n\n{}\n\nDecompose the query into tasks.",
        build_catalog_prompt(catalog)
    )
}

fn build_catalog_prompt(catalog: &[ToolDescriptor]) -> String {
    if catalog.is_empty() {
        return "Available tools: none. Every task must work without tools.".to_string();
    }
    let tools_text = catalog
        .iter()
        .map(|tool| {
            format!(
                " - name: {}\n   description: {}\n   parameters: {}",
                tool.name, tool.description, tool.input_schema
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Available tools:\n{tools_text}\n\nIMPORTANT: These are the ONLY tools available. Do not use or reference any other tools."
    )
}

pub const EXECUTOR_SYSTEM_PROMPT: &str = r#"
You execute one task of a larger plan. Use the provided tools when they
help; call a tool rather than guessing at data you do not have. After
tool results arrive, synthesize a direct, complete answer to the task.
Start your answer with a one-line summary of your approach.
"#;

pub const REASONING_SYSTEM_PROMPT: &str = r#"
You execute one task of a larger plan using reasoning alone; no tools
are available. Answer the task directly and completely from the task
description and any dependency results provided.
Start your answer with a one-line summary of your approach.
"#;

pub fn build_task_prompt(task: &Task, dependency_results: &DependencyResults) -> String {
    let deps = if dependency_results.is_empty() {
        "None".to_string()
    } else {
        dependency_results
            .iter()
            .map(|(id, result)| format!(" - {id}: {result}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "Task: {}\n\nResults from prerequisite tasks:\n{deps}",
        task.description
    )
}

pub fn build_batch_prompt(tasks: &[Task]) -> String {
    let listing = tasks
        .iter()
        .enumerate()
        .map(|(i, task)| format!("{}. [{}] {}", i + 1, task.id, task.description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Execute the following independent tasks. Issue any tool calls in \
task order, then answer each task in turn, labelled by its id.\n\n{listing}"
    )
}

pub const VERIFIER_SYSTEM_PROMPT: &str = r#"
You verify whether task results correctly and consistently answer the
original query. Your only output must be valid JSON matching:

{
  "overallCorrect": true,
  "confidence": 90,
  "taskVerifications": [
    {
      "taskId": "task_1",
      "isCorrect": true,
      "reasoning": "why",
      "confidence": 90,
      "issues": []
    }
  ],
  "finalAnswer": "the combined answer to the query",
  "reasoning": "overall assessment",
  "recommendations": []
}

Confidence values are 0-100. Record every inconsistency or error you
find in the issues array of the affected task. Never include markdown
outside the JSON.
"#;

pub fn build_verifier_prompt(query: &str, task_results: &[TaskResultView]) -> String {
    let results = task_results
        .iter()
        .map(|view| {
            format!(
                "Task {} - {}\nResult:\n{}",
                view.id, view.description, view.result
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("Original query:\n{query}\n\nTask results:\n\n{results}")
}

pub const CRITIC_SYSTEM_PROMPT: &str = r#"
You present verified results to the user. Write the final answer to the
query in clear, well-organized prose. Use headings or lists when they
aid readability. If the verification flagged issues, acknowledge the
uncertainty honestly. Output only the answer itself.
"#;

pub fn build_critic_prompt(
    query: &str,
    verification: &VerificationReport,
    raw_results: Option<&[ExecutionResult]>,
) -> String {
    let mut prompt = format!(
        "Original query:\n{query}\n\nVerified answer draft:\n{}\n\nVerification: correct={}, confidence={:.0}",
        verification.final_answer, verification.overall_correct, verification.confidence
    );

    let issues: Vec<&str> = verification
        .task_verifications
        .iter()
        .flat_map(|v| v.issues.iter().map(|s| s.as_str()))
        .collect();
    if !issues.is_empty() {
        prompt.push_str("\nKnown issues:\n");
        for issue in issues {
            prompt.push_str(&format!(" - {issue}\n"));
        }
    }

    if let Some(results) = raw_results {
        prompt.push_str("\nRaw task results:\n");
        for result in results {
            prompt.push_str(&format!(" - {}: {}\n", result.task_id, result.result));
        }
    }

    prompt.push_str("\nWrite the final answer for the user.");
    prompt
}
