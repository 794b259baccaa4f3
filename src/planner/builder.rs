use super::heuristic;
use super::types::Plan;
use crate::interpreter::Interpreter;
use std::sync::Arc;

/// Turns raw user text into an unapproved plan.
///
/// Never executes anything and never consults the allowlist: vetting happens
/// at execution time.
pub struct PlanBuilder {
    interpreter: Arc<dyn Interpreter>,
}

impl PlanBuilder {
    pub fn new(interpreter: Arc<dyn Interpreter>) -> Self {
        Self { interpreter }
    }

    pub async fn build(&self, text: &str) -> Plan {
        let tasks = match self.interpreter.interpret(text).await {
            Ok(tasks) if !tasks.is_empty() => {
                tracing::debug!(
                    interpreter = self.interpreter.name(),
                    count = tasks.len(),
                    "using interpreter tasks"
                );
                tasks
            }
            Ok(_) => {
                tracing::debug!(
                    interpreter = self.interpreter.name(),
                    "interpreter proposed nothing, using heuristic"
                );
                heuristic::tasks_for(text)
            }
            Err(e) => {
                tracing::warn!(
                    interpreter = self.interpreter.name(),
                    error = %e,
                    "interpreter failed, using heuristic"
                );
                heuristic::tasks_for(text)
            }
        };

        let plan = Plan::new(text, tasks);
        tracing::info!(plan_id = %plan.id, tasks = plan.tasks.len(), trust = ?plan.trust, "plan built");
        plan
    }
}
