//! Append-only record of executed actions.
//!
//! The log is a single JSON array on disk. Appending rewrites the whole
//! file through a temporary sibling and a rename, so a crash mid-write
//! leaves the previous version intact.

use crate::config::Config;
use crate::planner::Plan;
use crate::security::ParsedCommand;
use crate::tools::{Script, TaskResult};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoggedAction {
    Plan(Plan),
    Command(ParsedCommand),
    Script(Script),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LoggedResult {
    Many(Vec<TaskResult>),
    Single(TaskResult),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub action: LoggedAction,
    pub result: LoggedResult,
}

impl LogEntry {
    pub fn now(action: LoggedAction, result: LoggedResult) -> Self {
        Self {
            timestamp: Utc::now(),
            action,
            result,
        }
    }
}

pub struct ActionLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ActionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.action_log_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record `entry`. Failures are logged and otherwise ignored: an action
    /// that already ran is never reported as failed because of the log.
    pub fn append(&self, entry: &LogEntry) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(error) = self.append_locked(entry) {
            tracing::error!(path = %self.path.display(), error = %format!("{error:#}"), "failed to write action log");
        }
    }

    /// [`append`](Self::append) on the blocking pool, for async callers.
    pub async fn record(self: Arc<Self>, entry: LogEntry) {
        if let Err(error) = tokio::task::spawn_blocking(move || self.append(&entry)).await {
            tracing::error!(%error, "action log writer panicked");
        }
    }

    /// All entries, oldest first. A missing file is an empty log.
    pub fn load(&self) -> Result<Vec<LogEntry>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read {}", self.path.display()));
            }
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", self.path.display()))
    }

    /// The last `limit` entries, oldest first.
    pub fn tail(&self, limit: usize) -> Result<Vec<LogEntry>> {
        let mut entries = self.load()?;
        let skip = entries.len().saturating_sub(limit);
        entries.drain(..skip);
        Ok(entries)
    }

    fn append_locked(&self, entry: &LogEntry) -> Result<()> {
        // Entries are kept as raw JSON so records this build cannot parse
        // survive the rewrite.
        let mut entries = self.read_raw()?;
        entries.push(serde_json::to_value(entry).context("failed to serialize log entry")?);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create log directory '{}'", parent.display())
            })?;
        }

        let rendered =
            serde_json::to_string_pretty(&entries).context("failed to serialize action log")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, rendered)
            .with_context(|| format!("failed to write '{}'", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace '{}'", self.path.display()))?;
        Ok(())
    }

    /// Existing records as raw JSON. Undecodable content is moved aside and
    /// the log restarts; any other read failure aborts the append so the
    /// file is left as it is.
    fn read_raw(&self) -> Result<Vec<serde_json::Value>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                self.set_aside(&e);
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read '{}'", self.path.display()));
            }
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Vec<serde_json::Value>>(&content) {
            Ok(entries) => Ok(entries),
            Err(error) => {
                self.set_aside(&error);
                Ok(Vec::new())
            }
        }
    }

    fn set_aside(&self, error: &dyn std::fmt::Display) {
        let backup = self
            .path
            .with_extension(format!("corrupt-{}.json", Utc::now().format("%Y%m%d%H%M%S")));
        let moved = fs::rename(&self.path, &backup).is_ok();
        tracing::warn!(
            path = %self.path.display(),
            backup = %backup.display(),
            moved,
            %error,
            "action log is corrupt; starting fresh"
        );
    }
}
