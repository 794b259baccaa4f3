//! The approval workflow: propose, review, approve, execute, record.

use crate::audit::{ActionLog, LogEntry, LoggedAction, LoggedResult};
use crate::config::Config;
use crate::error::{GateError, Result};
use crate::interpreter;
use crate::planner::{Plan, PlanBuilder, PlanExecutor};
use crate::security::{Allowlist, ApprovalGate, ParsedCommand, PendingAction, PendingKind};
use crate::tools::{Script, ScriptOs, TaskResult};
use std::sync::Arc;

/// What an approval ran and how it went.
#[derive(Debug, Clone)]
pub enum Outcome {
    Plan { plan: Plan, results: Vec<TaskResult> },
    Command { command: ParsedCommand, result: TaskResult },
    Script { script: Script, result: TaskResult },
}

impl Outcome {
    pub fn succeeded(&self) -> bool {
        match self {
            Self::Plan { results, .. } => results.iter().all(|r| r.success),
            Self::Command { result, .. } | Self::Script { result, .. } => result.success,
        }
    }
}

/// One user's conversation with the gate. Owns the pending slot; nothing
/// here is global.
pub struct Session {
    gate: ApprovalGate,
    allowlist: Arc<Allowlist>,
    builder: PlanBuilder,
    executor: PlanExecutor,
    log: Arc<ActionLog>,
}

impl Session {
    pub fn new(
        allowlist: Arc<Allowlist>,
        builder: PlanBuilder,
        executor: PlanExecutor,
        log: ActionLog,
    ) -> Self {
        Self {
            gate: ApprovalGate::new(),
            allowlist,
            builder,
            executor,
            log: Arc::new(log),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let allowlist = Arc::new(Allowlist::from_config(config));
        Self::new(
            Arc::clone(&allowlist),
            PlanBuilder::new(interpreter::from_config(&config.interpreter)),
            PlanExecutor::from_config(config, allowlist),
            ActionLog::from_config(config),
        )
    }

    /// Build a plan from `text` and make it the pending action.
    pub async fn build_plan(&self, text: &str) -> Plan {
        let plan = self.builder.build(text).await;
        self.gate.propose(PendingAction::Plan(plan.clone()));
        plan
    }

    pub fn propose_command(&self, parsed: ParsedCommand) {
        self.gate.propose(PendingAction::Command(parsed));
    }

    pub fn propose_script(&self, os: ScriptOs, body: impl Into<String>) -> Script {
        let script = Script::new(os, body);
        self.gate.propose(PendingAction::Script(script.clone()));
        script
    }

    /// Execute whatever is pending.
    pub async fn approve(&self) -> Result<Outcome> {
        let action = self.gate.take_any()?;
        self.run(action).await
    }

    pub async fn approve_plan(&self) -> Result<Vec<TaskResult>> {
        match self.approve_kind(PendingKind::Plan).await? {
            Outcome::Plan { results, .. } => Ok(results),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn approve_command(&self) -> Result<TaskResult> {
        match self.approve_kind(PendingKind::Command).await? {
            Outcome::Command { result, .. } => Ok(result),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn approve_script(&self) -> Result<TaskResult> {
        match self.approve_kind(PendingKind::Script).await? {
            Outcome::Script { result, .. } => Ok(result),
            other => Err(unexpected(&other)),
        }
    }

    pub fn add_allowed(&self, prefix: &str) -> Result<bool> {
        Ok(self.allowlist.add(prefix)?)
    }

    pub fn is_allowed(&self, command: &str) -> bool {
        self.allowlist.is_allowed(command)
    }

    pub fn allowlist(&self) -> Vec<String> {
        self.allowlist.entries()
    }

    pub fn pending(&self) -> Option<PendingAction> {
        self.gate.peek()
    }

    /// Drop the pending action without running it.
    pub fn discard(&self) -> Option<PendingAction> {
        self.gate.clear()
    }

    /// The newest `limit` log entries, oldest first.
    pub fn history(&self, limit: usize) -> Result<Vec<LogEntry>> {
        Ok(self.log.tail(limit)?)
    }

    async fn approve_kind(&self, kind: PendingKind) -> Result<Outcome> {
        let action = self.gate.take(kind)?;
        self.run(action).await
    }

    // The gate lock is already released here; a new proposal may land while
    // this runs.
    async fn run(&self, action: PendingAction) -> Result<Outcome> {
        let outcome = match action {
            PendingAction::Plan(mut plan) => {
                let results = self.executor.execute(&mut plan).await?;
                Outcome::Plan { plan, results }
            }
            PendingAction::Command(command) => {
                let result = self.executor.execute_command(&command).await?;
                Outcome::Command { command, result }
            }
            PendingAction::Script(script) => {
                let result = self.executor.execute_script(&script).await?;
                Outcome::Script { script, result }
            }
        };

        Arc::clone(&self.log).record(log_entry(&outcome)).await;
        Ok(outcome)
    }
}

fn log_entry(outcome: &Outcome) -> LogEntry {
    let (action, result) = match outcome {
        Outcome::Plan { plan, results } => (
            LoggedAction::Plan(plan.clone()),
            LoggedResult::Many(results.clone()),
        ),
        Outcome::Command { command, result } => (
            LoggedAction::Command(command.clone()),
            LoggedResult::Single(result.clone()),
        ),
        Outcome::Script { script, result } => (
            LoggedAction::Script(script.clone()),
            LoggedResult::Single(result.clone()),
        ),
    };
    LogEntry::now(action, result)
}

fn unexpected(outcome: &Outcome) -> GateError {
    GateError::Other(anyhow::anyhow!(
        "approval returned an unexpected outcome: {outcome:?}"
    ))
}
