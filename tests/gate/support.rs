#![allow(dead_code)]

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use tempfile::TempDir;

use echo_gate::Config;
use echo_gate::audit::ActionLog;
use echo_gate::interpreter::{Interpreter, NoopInterpreter};
use echo_gate::planner::{PlanBuilder, PlanExecutor};
use echo_gate::security::Allowlist;
use echo_gate::session::Session;
use echo_gate::tools::Task;

/// Always proposes the same tasks.
pub struct ScriptedInterpreter(pub Vec<Task>);

impl Interpreter for ScriptedInterpreter {
    fn name(&self) -> &str {
        "scripted"
    }

    fn interpret<'a>(
        &'a self,
        _text: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<Task>>> + Send + 'a>> {
        let tasks = self.0.clone();
        Box::pin(async move { Ok(tasks) })
    }
}

/// A config file, state directory and working directory inside a temp dir.
pub struct Harness {
    pub tmp: TempDir,
    pub config: Config,
}

impl Harness {
    pub fn new(allowlist: &[&str]) -> Self {
        Self::with_timeout(allowlist, 10)
    }

    pub fn with_timeout(allowlist: &[&str], timeout_secs: u64) -> Self {
        let tmp = TempDir::new().unwrap();
        let work = tmp.path().join("work");
        std::fs::create_dir_all(&work).unwrap();

        let entries = allowlist
            .iter()
            .map(|entry| format!("{entry:?}"))
            .collect::<Vec<_>>()
            .join(", ");
        let toml = format!(
            "allowlist = [{entries}]\n\n\
             [execution]\n\
             command_timeout_secs = {timeout_secs}\n\
             shell = \"/bin/sh\"\n\
             working_dir = {work:?}\n",
            work = work.display().to_string(),
        );
        let config_path = tmp.path().join("config.toml");
        std::fs::write(&config_path, toml).unwrap();

        let config = Config::load_from(&config_path).unwrap();
        Self { tmp, config }
    }

    pub fn work_dir(&self) -> PathBuf {
        self.tmp.path().join("work")
    }

    pub fn config_path(&self) -> &Path {
        &self.config.config_path
    }

    pub fn session(&self) -> Session {
        self.session_with(Arc::new(NoopInterpreter))
    }

    pub fn session_with(&self, interpreter: Arc<dyn Interpreter>) -> Session {
        let allowlist = Arc::new(Allowlist::from_config(&self.config));
        Session::new(
            Arc::clone(&allowlist),
            PlanBuilder::new(interpreter),
            PlanExecutor::from_config(&self.config, allowlist),
            ActionLog::from_config(&self.config),
        )
    }

    pub fn scripted_session(&self, tasks: Vec<Task>) -> Session {
        self.session_with(Arc::new(ScriptedInterpreter(tasks)))
    }

    pub fn log(&self) -> ActionLog {
        ActionLog::from_config(&self.config)
    }
}
