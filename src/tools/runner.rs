use super::file_write::{create_file, write_to_file};
use super::process::{HostSpawner, Invocation, ProcessSpawner};
use super::types::{Task, TaskResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Executes single tasks. Holds only immutable settings, so any number of
/// runs can share one runner without observing each other.
#[derive(Clone)]
pub struct TaskRunner {
    spawner: Arc<dyn ProcessSpawner>,
    shell: String,
    working_dir: Option<PathBuf>,
}

impl TaskRunner {
    pub fn new(shell: impl Into<String>, working_dir: Option<PathBuf>) -> Self {
        Self::with_spawner(Arc::new(HostSpawner::new()), shell, working_dir)
    }

    pub fn with_spawner(
        spawner: Arc<dyn ProcessSpawner>,
        shell: impl Into<String>,
        working_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            spawner,
            shell: shell.into(),
            working_dir,
        }
    }

    pub fn from_config(config: &crate::config::ExecutionConfig) -> Self {
        Self::new(config.shell.clone(), config.resolved_working_dir())
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// Run one task. Never fails: every problem ends up in the result.
    pub async fn run(&self, task: &Task, timeout: Duration) -> TaskResult {
        let result = match task {
            Task::Command { command } => {
                let invocation =
                    Invocation::shell(&self.shell, command).in_dir(self.working_dir.clone());
                self.spawner.run(&invocation, timeout).await
            }
            Task::CreateFile { path } => create_file(&self.resolve(path)).await,
            Task::WriteToFile { path, content } => {
                write_to_file(&self.resolve(path), content).await
            }
            Task::Unknown { kind } => TaskResult::failed(format!("unknown task type: {kind}")),
        };

        tracing::info!(
            kind = task.kind(),
            success = result.success,
            exit_code = ?result.exit_code,
            "task finished"
        );
        result
    }

    /// Run an already-built invocation (used for staged scripts).
    pub async fn run_invocation(&self, invocation: &Invocation, timeout: Duration) -> TaskResult {
        self.spawner.run(invocation, timeout).await
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.working_dir {
            Some(dir) if path.is_relative() && !path.as_os_str().is_empty() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}
