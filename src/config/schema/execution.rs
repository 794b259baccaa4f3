use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// What the plan executor does after a task fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Keep running the remaining tasks (best effort)
    #[default]
    Continue,
    /// Stop at the first failure; remaining tasks are reported as skipped
    FailFast,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Shell used for command tasks, invoked as `<shell> -c <command>`.
    #[serde(default = "default_shell")]
    pub shell: String,
    /// Working directory for commands and relative file paths. Supports `~`.
    #[serde(default)]
    pub working_dir: Option<String>,
}

fn default_command_timeout_secs() -> u64 {
    30
}

fn default_shell() -> String {
    "/bin/bash".into()
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            command_timeout_secs: default_command_timeout_secs(),
            failure_policy: FailurePolicy::default(),
            shell: default_shell(),
            working_dir: None,
        }
    }
}

impl ExecutionConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn resolved_working_dir(&self) -> Option<PathBuf> {
        self.working_dir
            .as_deref()
            .map(str::trim)
            .filter(|dir| !dir.is_empty())
            .map(|dir| PathBuf::from(shellexpand::tilde(dir).into_owned()))
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.command_timeout_secs == 0 {
            anyhow::bail!("execution.command_timeout_secs must be greater than 0");
        }
        if self.shell.trim().is_empty() {
            anyhow::bail!("execution.shell must not be empty");
        }
        Ok(())
    }
}
