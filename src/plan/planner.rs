//! Query decomposition into a directed task graph.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    error::{Error, Result},
    model::{ChatMessage, ModelClient, SamplingParams},
    plan::model::Plan,
    prompt::builder::{PLANNER_SYSTEM_PROMPT, build_planner_prompt},
    registry::ToolDescriptor,
    utils::StripCodeBlock,
};

pub struct Planner {
    model: Arc<dyn ModelClient>,
}

impl Planner {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }

    /// Decompose `query` into a validated plan constrained to the tools
    /// in `catalog`. Unparseable model output and non-signal model
    /// failures degrade to a single-task fallback plan; only structural
    /// faults (duplicate ids, blank descriptions) and provider
    /// rate-limit/auth signals fail the call.
    pub async fn plan(
        &self,
        query: &str,
        catalog: &[ToolDescriptor],
        params: &SamplingParams,
    ) -> Result<Plan> {
        if query.trim().is_empty() {
            return Err(Error::Validation("query must not be empty".to_string()));
        }

        let messages = vec![
            ChatMessage::system(PLANNER_SYSTEM_PROMPT),
            ChatMessage::user(&build_planner_prompt(query, catalog)),
        ];

        let mut plan = match self.model.chat(&messages, &[], params).await {
            Ok(response) => match Self::parse_plan(response.text()) {
                Some(plan) => plan,
                None => {
                    warn!("planner output was not valid plan JSON, using fallback plan");
                    Plan::fallback(query)
                }
            },
            Err(e) if e.is_provider_signal() => return Err(e),
            Err(e) => {
                warn!(error = %e, "planner model call failed, using fallback plan");
                Plan::fallback(query)
            }
        };

        Self::validate(&mut plan)?;
        info!(tasks = plan.tasks.len(), "plan generated");
        Ok(plan)
    }

    fn parse_plan(text: &str) -> Option<Plan> {
        let stripped = text.strip_code_block();
        serde_json::from_str::<Plan>(stripped).ok()
    }

    /// Repair recoverable defects in place and reject unrecoverable
    /// ones. Dropped edges are warnings, not errors.
    fn validate(plan: &mut Plan) -> Result<()> {
        let mut seen: HashSet<&str> = HashSet::new();
        for task in &plan.tasks {
            if !seen.insert(task.id.as_str()) {
                return Err(Error::InvalidPlan(format!(
                    "duplicate task id '{}'",
                    task.id
                )));
            }
            if task.description.trim().is_empty() {
                return Err(Error::InvalidPlan(format!(
                    "task '{}' has an empty description",
                    task.id
                )));
            }
        }

        let ids: HashSet<String> = plan.tasks.iter().map(|t| t.id.clone()).collect();
        for task in &mut plan.tasks {
            let id = task.id.clone();
            task.dependencies.retain(|dep| {
                if dep == &id {
                    warn!(task = %id, "dropping self-dependency");
                    return false;
                }
                if !ids.contains(dep) {
                    warn!(task = %id, dependency = %dep, "dropping dependency on unknown task");
                    return false;
                }
                true
            });
        }

        plan.total_steps = plan.tasks.len();
        Ok(())
    }
}
