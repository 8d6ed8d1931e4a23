//! Per-task tool-calling execution loop.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    error::Result,
    execute::model::{DependencyResults, ExecutionResult, ToolCallRecord, ToolInvocation},
    model::{ChatMessage, ModelClient, SamplingParams, ToolCallRequest},
    plan::Task,
    prompt::builder::{
        EXECUTOR_SYSTEM_PROMPT, REASONING_SYSTEM_PROMPT, build_batch_prompt, build_task_prompt,
    },
    registry::{ToolDescriptor, ToolRegistry},
};

const FALLBACK_REASONING: &str = "Executed the task as described";

pub struct Executor {
    model: Arc<dyn ModelClient>,
    registry: Arc<ToolRegistry>,
}

impl Executor {
    pub fn new(model: Arc<dyn ModelClient>, registry: Arc<ToolRegistry>) -> Self {
        Self { model, registry }
    }

    /// Run one task. With tools available this is a single tool-calling
    /// round-trip: model requests calls, the calls run sequentially
    /// through the registry, and the `{call, result}` pairs go back to
    /// the model in one follow-up turn for synthesis. A second round of
    /// requested calls is not re-invoked.
    ///
    /// A failing tool call never aborts the task; `success` is false
    /// only when the model call itself could not be completed. Provider
    /// rate-limit/auth signals propagate as errors so the caller can
    /// react.
    pub async fn run(
        &self,
        task: &Task,
        available_tools: &[ToolDescriptor],
        dependency_results: &DependencyResults,
        params: &SamplingParams,
    ) -> Result<ExecutionResult> {
        info!(task = %task.id, tools = available_tools.len(), "executing task");
        let prompt = build_task_prompt(task, dependency_results);

        if available_tools.is_empty() {
            let messages = vec![
                ChatMessage::system(REASONING_SYSTEM_PROMPT),
                ChatMessage::user(&prompt),
            ];
            return match self.model.chat(&messages, &[], params).await {
                Ok(response) => Ok(self.finish(task, response.text().to_string(), Vec::new(), true)),
                Err(e) => self.absorb_model_failure(task, Vec::new(), e),
            };
        }

        let schemas: Vec<Value> = available_tools
            .iter()
            .map(|t| t.to_function_schema())
            .collect();
        let mut messages = vec![
            ChatMessage::system(EXECUTOR_SYSTEM_PROMPT),
            ChatMessage::user(&prompt),
        ];

        let response = match self.model.chat(&messages, &schemas, params).await {
            Ok(response) => response,
            Err(e) => return self.absorb_model_failure(task, Vec::new(), e),
        };

        if !response.has_tool_calls() {
            return Ok(self.finish(task, response.text().to_string(), Vec::new(), true));
        }

        let records = self
            .invoke_tool_calls(&response.tool_calls, available_tools)
            .await;

        messages.push(ChatMessage::assistant_tool_calls(response.tool_calls.clone()));
        for (request, record) in response.tool_calls.iter().zip(&records) {
            let rendered = serde_json::to_string(&record.result)
                .unwrap_or_else(|_| record.result.to_string());
            messages.push(ChatMessage::tool_result(&request.id, &rendered));
        }

        let followup = match self.model.chat(&messages, &schemas, params).await {
            Ok(followup) => followup,
            Err(e) => return self.absorb_model_failure(task, records, e),
        };
        if followup.has_tool_calls() {
            // One round-trip only; further requested calls are an
            // extension point, not executed.
            warn!(task = %task.id, "model requested a second tool round, not re-invoked");
        }

        Ok(self.finish(task, followup.text().to_string(), records, true))
    }

    /// Batch variant: several independent tasks share one model call and
    /// one tool catalog. Returned tool calls map back to tasks
    /// positionally (call i -> task i), a heuristic that assumes the
    /// model issues calls in task order.
    pub async fn run_batch(
        &self,
        tasks: &[Task],
        available_tools: &[ToolDescriptor],
        params: &SamplingParams,
    ) -> Result<Vec<ExecutionResult>> {
        if tasks.is_empty() {
            return Ok(Vec::new());
        }
        info!(tasks = tasks.len(), "executing task batch");

        let schemas: Vec<Value> = available_tools
            .iter()
            .map(|t| t.to_function_schema())
            .collect();
        let mut messages = vec![
            ChatMessage::system(EXECUTOR_SYSTEM_PROMPT),
            ChatMessage::user(&build_batch_prompt(tasks)),
        ];

        let response = match self.model.chat(&messages, &schemas, params).await {
            Ok(response) => response,
            Err(e) => {
                return tasks
                    .iter()
                    .map(|task| self.absorb_model_failure(task, Vec::new(), clone_failure(&e)))
                    .collect();
            }
        };

        let mut per_task: Vec<Vec<ToolCallRecord>> = vec![Vec::new(); tasks.len()];
        if response.has_tool_calls() {
            let records = self
                .invoke_tool_calls(&response.tool_calls, available_tools)
                .await;
            if records.len() > tasks.len() {
                warn!(
                    calls = records.len(),
                    tasks = tasks.len(),
                    "more tool calls than tasks, extras recorded against the last task"
                );
            }
            for (i, record) in records.iter().enumerate() {
                let slot = i.min(tasks.len() - 1);
                per_task[slot].push(record.clone());
            }

            messages.push(ChatMessage::assistant_tool_calls(response.tool_calls.clone()));
            for (request, record) in response.tool_calls.iter().zip(&records) {
                let rendered = serde_json::to_string(&record.result)
                    .unwrap_or_else(|_| record.result.to_string());
                messages.push(ChatMessage::tool_result(&request.id, &rendered));
            }

            let followup = match self.model.chat(&messages, &schemas, params).await {
                Ok(followup) => followup,
                Err(e) => {
                    return tasks
                        .iter()
                        .zip(per_task)
                        .map(|(task, records)| {
                            self.absorb_model_failure(task, records, clone_failure(&e))
                        })
                        .collect();
                }
            };
            let text = followup.text().to_string();
            return Ok(tasks
                .iter()
                .zip(per_task)
                .map(|(task, records)| self.finish(task, text.clone(), records, true))
                .collect());
        }

        let text = response.text().to_string();
        Ok(tasks
            .iter()
            .zip(per_task)
            .map(|(task, records)| self.finish(task, text.clone(), records, true))
            .collect())
    }

    /// Invoke requested calls one at a time, capturing each outcome as
    /// data. Malformed arguments and routing failures become `{error}`
    /// records; execution continues with the next call.
    async fn invoke_tool_calls(
        &self,
        requests: &[ToolCallRequest],
        catalog: &[ToolDescriptor],
    ) -> Vec<ToolCallRecord> {
        let mut records = Vec::with_capacity(requests.len());
        for request in requests {
            let arguments = match request.decode_arguments() {
                Ok(arguments) => arguments,
                Err(e) => {
                    warn!(tool = %request.name, error = %e, "tool call arguments unparseable");
                    records.push(ToolCallRecord {
                        call: ToolInvocation {
                            name: request.name.clone(),
                            arguments: Value::String(request.arguments.clone()),
                        },
                        result: serde_json::json!({"error": e.to_string()}),
                    });
                    continue;
                }
            };

            debug!(tool = %request.name, "invoking tool call");
            let result = match self
                .registry
                .call_with_catalog(&request.name, arguments.clone(), catalog)
                .await
            {
                Ok(result) => result,
                Err(e) => {
                    warn!(tool = %request.name, error = %e, "tool call failed");
                    serde_json::json!({"error": e.to_string()})
                }
            };

            records.push(ToolCallRecord {
                call: ToolInvocation {
                    name: request.name.clone(),
                    arguments,
                },
                result,
            });
        }
        records
    }

    fn finish(
        &self,
        task: &Task,
        result: String,
        tool_calls: Vec<ToolCallRecord>,
        success: bool,
    ) -> ExecutionResult {
        let reasoning = extract_reasoning(&result);
        ExecutionResult {
            task_id: task.id.clone(),
            result,
            tool_calls,
            success,
            reasoning,
            finished_at: Utc::now(),
        }
    }

    fn absorb_model_failure(
        &self,
        task: &Task,
        tool_calls: Vec<ToolCallRecord>,
        error: crate::error::Error,
    ) -> Result<ExecutionResult> {
        if error.is_provider_signal() {
            return Err(error);
        }
        warn!(task = %task.id, error = %error, "model call failed, task marked unsuccessful");
        Ok(ExecutionResult {
            task_id: task.id.clone(),
            result: format!("Task failed: {error}"),
            tool_calls,
            success: false,
            reasoning: FALLBACK_REASONING.to_string(),
            finished_at: Utc::now(),
        })
    }
}

/// A one-line summary pulled heuristically from the result text: the
/// first line mentioning reasoning/approach/strategy, else the first
/// substantive non-code line, else a fixed fallback.
pub fn extract_reasoning(text: &str) -> String {
    let mut in_fence = false;
    let mut first_substantive: Option<&str> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence || trimmed.is_empty() {
            continue;
        }
        let lower = trimmed.to_lowercase();
        if lower.contains("reasoning") || lower.contains("approach") || lower.contains("strategy") {
            return trimmed.to_string();
        }
        if first_substantive.is_none() && trimmed.len() > 2 {
            first_substantive = Some(trimmed);
        }
    }

    first_substantive
        .map(|s| s.to_string())
        .unwrap_or_else(|| FALLBACK_REASONING.to_string())
}

fn clone_failure(error: &crate::error::Error) -> crate::error::Error {
    match error {
        crate::error::Error::RateLimited(msg) => crate::error::Error::RateLimited(msg.clone()),
        crate::error::Error::AuthRejected(msg) => crate::error::Error::AuthRejected(msg.clone()),
        other => crate::error::Error::Model(other.to_string()),
    }
}
