use super::types::{Plan, PlanStatus};
use crate::config::{Config, FailurePolicy};
use crate::error::ExecutionError;
use crate::security::{Allowlist, ParsedCommand};
use crate::tools::{Script, Task, TaskResult, TaskRunner};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Runs approved work: plans, single commands and scripts.
///
/// Every command line is checked against the allowlist before anything
/// runs. One rejected command refuses the whole unit of work.
pub struct PlanExecutor {
    allowlist: Arc<Allowlist>,
    runner: TaskRunner,
    timeout: Duration,
    policy: FailurePolicy,
    scripts_dir: PathBuf,
}

impl PlanExecutor {
    pub fn new(
        allowlist: Arc<Allowlist>,
        runner: TaskRunner,
        timeout: Duration,
        policy: FailurePolicy,
        scripts_dir: PathBuf,
    ) -> Self {
        Self {
            allowlist,
            runner,
            timeout,
            policy,
            scripts_dir,
        }
    }

    pub fn from_config(config: &Config, allowlist: Arc<Allowlist>) -> Self {
        Self::new(
            allowlist,
            TaskRunner::from_config(&config.execution),
            config.execution.command_timeout(),
            config.execution.failure_policy,
            config.scripts_dir(),
        )
    }

    /// Validate, then run every task in order. Returns one result per task.
    ///
    /// On rejection no task runs and the plan is marked `rejected`.
    pub async fn execute(&self, plan: &mut Plan) -> Result<Vec<TaskResult>, ExecutionError> {
        if let Some(command) = self.allowlist.first_disallowed(plan.commands()) {
            tracing::warn!(plan_id = %plan.id, command = %command, "plan rejected");
            let command = command.to_string();
            plan.status = PlanStatus::Rejected;
            return Err(ExecutionError::CommandNotAllowed { command });
        }

        plan.status = PlanStatus::Approved;
        tracing::info!(plan_id = %plan.id, tasks = plan.tasks.len(), "executing plan");

        let mut results = Vec::with_capacity(plan.tasks.len());
        let mut failed = false;
        for task in &plan.tasks {
            if failed && self.policy == FailurePolicy::FailFast {
                results.push(TaskResult::skipped());
                continue;
            }
            let result = self.runner.run(task, self.timeout).await;
            failed |= !result.success;
            results.push(result);
        }

        plan.status = PlanStatus::Executed;
        tracing::info!(
            plan_id = %plan.id,
            succeeded = results.iter().filter(|r| r.success).count(),
            failed = results.iter().filter(|r| !r.success).count(),
            "plan executed"
        );
        Ok(results)
    }

    pub async fn execute_command(
        &self,
        parsed: &ParsedCommand,
    ) -> Result<TaskResult, ExecutionError> {
        if !self.allowlist.is_allowed(&parsed.command) {
            return Err(ExecutionError::CommandNotAllowed {
                command: parsed.command.clone(),
            });
        }
        tracing::info!(summary = %parsed.summary, command = %parsed.command, "executing command");
        Ok(self
            .runner
            .run(&Task::command(parsed.command.as_str()), self.timeout)
            .await)
    }

    /// Check every executable line, stage the script and run it.
    pub async fn execute_script(&self, script: &Script) -> Result<TaskResult, ExecutionError> {
        if let Some(line) = self.allowlist.first_disallowed(script.command_lines()) {
            tracing::warn!(script_id = %script.id, command = %line, "script rejected");
            return Err(ExecutionError::CommandNotAllowed {
                command: line.to_string(),
            });
        }

        let staged = script.stage(&self.scripts_dir)?;
        tracing::info!(
            script_id = %script.id,
            os = script.os.as_str(),
            path = %staged.display(),
            "executing script"
        );

        let invocation = script
            .invocation(&staged, self.runner.shell())
            .in_dir(self.runner.working_dir().map(std::path::Path::to_path_buf));
        Ok(self.runner.run_invocation(&invocation, self.timeout).await)
    }
}
