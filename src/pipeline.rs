//! Caller-side orchestration of the five stages.
//!
//! The stages themselves are stateless and ordering-free; this module
//! is the caller the stage contracts refer to. It discovers tools,
//! plans, topologically orders the task graph, threads each task's
//! resolved dependency outputs into the executor, verifies, and formats.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::{
    critic::{Critic, CriticOutput},
    error::{Error, Result},
    execute::{DependencyResults, ExecutionResult, Executor},
    model::{ModelClient, SamplingParams},
    plan::{Plan, Planner, Task},
    registry::{ToolDescriptor, ToolRegistry},
    verify::{TaskResultView, VerificationReport, Verifier},
};

#[derive(Debug)]
pub struct PipelineOutput {
    pub plan: Plan,
    pub executions: Vec<ExecutionResult>,
    pub report: VerificationReport,
    pub answer: CriticOutput,
}

pub struct Pipeline {
    registry: Arc<ToolRegistry>,
    planner: Planner,
    executor: Executor,
    verifier: Verifier,
    critic: Critic,
    params: SamplingParams,
}

impl Pipeline {
    pub fn new(model: Arc<dyn ModelClient>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            planner: Planner::new(model.clone()),
            executor: Executor::new(model.clone(), registry.clone()),
            verifier: Verifier::new(model.clone()),
            critic: Critic::new(model),
            registry,
            params: SamplingParams::default(),
        }
    }

    pub fn with_params(mut self, params: SamplingParams) -> Self {
        self.params = params;
        self
    }

    /// Run the whole pipeline for one query. Nothing survives the call;
    /// every artifact is request-scoped.
    pub async fn run(&self, query: &str) -> Result<PipelineOutput> {
        if query.trim().is_empty() {
            return Err(Error::Validation("query must not be empty".to_string()));
        }

        let catalog = self.registry.discover().await?;
        let plan = self.planner.plan(query, &catalog, &self.params).await?;

        let order = topological_order(&plan.tasks)?;
        let mut results_by_id: HashMap<String, Value> = HashMap::new();
        let mut executions = Vec::with_capacity(plan.tasks.len());

        for index in order {
            let task = &plan.tasks[index];
            let tools = relevant_tools(task, &catalog);
            let deps = resolve_dependencies(task, &results_by_id);

            let execution = self
                .executor
                .run(task, &tools, &deps, &self.params)
                .await?;
            results_by_id.insert(task.id.clone(), Value::String(execution.result.clone()));
            executions.push(execution);
        }

        let views: Vec<TaskResultView> = plan
            .tasks
            .iter()
            .map(|task| TaskResultView {
                id: task.id.clone(),
                description: task.description.clone(),
                result: results_by_id
                    .get(&task.id)
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
            })
            .collect();

        let report = self.verifier.verify(query, &views, &self.params).await?;
        let answer = self
            .critic
            .format(query, &report, Some(&executions), &self.params)
            .await?;

        info!("pipeline complete");
        Ok(PipelineOutput {
            plan,
            executions,
            report,
            answer,
        })
    }
}

fn relevant_tools(task: &Task, catalog: &[ToolDescriptor]) -> Vec<ToolDescriptor> {
    catalog
        .iter()
        .filter(|tool| task.tools.contains(&tool.name))
        .cloned()
        .collect()
}

fn resolve_dependencies(task: &Task, results: &HashMap<String, Value>) -> DependencyResults {
    task.dependencies
        .iter()
        .filter_map(|dep| results.get(dep).map(|v| (dep.clone(), v.clone())))
        .collect()
}

/// Kahn's algorithm over the task graph; a cycle is an invalid plan.
pub fn topological_order(tasks: &[Task]) -> Result<Vec<usize>> {
    let index_of: HashMap<&str, usize> = tasks
        .iter()
        .enumerate()
        .map(|(i, t)| (t.id.as_str(), i))
        .collect();

    let mut in_degree = vec![0usize; tasks.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];
    for (i, task) in tasks.iter().enumerate() {
        for dep in &task.dependencies {
            if let Some(&d) = index_of.get(dep.as_str()) {
                in_degree[i] += 1;
                dependents[d].push(i);
            }
        }
    }

    let mut ready: VecDeque<usize> =
        (0 .. tasks.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(tasks.len());
    while let Some(next) = ready.pop_front() {
        order.push(next);
        for &dependent in &dependents[next] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.push_back(dependent);
            }
        }
    }

    if order.len() != tasks.len() {
        return Err(Error::InvalidPlan(
            "dependency cycle in task graph".to_string(),
        ));
    }
    Ok(order)
}
