use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One atomic unit of work inside a plan.
///
/// On the wire a task is a JSON object tagged by `"type"`:
/// `{"type": "command", "command": "ls"}`,
/// `{"type": "create_file", "path": "out.txt"}`,
/// `{"type": "write_to_file", "path": "out.txt", "content": "hi"}`.
/// Records with any other tag deserialize to [`Task::Unknown`] so the runner
/// can report them instead of the whole plan failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TaskRecord", into = "TaskRecord")]
pub enum Task {
    Command { command: String },
    CreateFile { path: PathBuf },
    WriteToFile { path: PathBuf, content: String },
    Unknown { kind: String },
}

impl Task {
    pub fn command(command: impl Into<String>) -> Self {
        Self::Command {
            command: command.into(),
        }
    }

    pub fn create_file(path: impl Into<PathBuf>) -> Self {
        Self::CreateFile { path: path.into() }
    }

    pub fn write_to_file(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self::WriteToFile {
            path: path.into(),
            content: content.into(),
        }
    }

    /// The wire tag for this task.
    pub fn kind(&self) -> &str {
        match self {
            Self::Command { .. } => "command",
            Self::CreateFile { .. } => "create_file",
            Self::WriteToFile { .. } => "write_to_file",
            Self::Unknown { kind } => kind,
        }
    }

    /// The shell command, for command tasks only.
    pub fn as_command(&self) -> Option<&str> {
        match self {
            Self::Command { command } => Some(command),
            _ => None,
        }
    }

    /// Short human-readable line used when presenting a plan for approval.
    pub fn summary(&self) -> String {
        match self {
            Self::Command { command } => format!("run `{command}`"),
            Self::CreateFile { path } => format!("create {}", path.display()),
            Self::WriteToFile { path, content } => {
                format!("write {} bytes to {}", content.len(), path.display())
            }
            Self::Unknown { kind } => format!("unsupported task `{kind}`"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TaskRecord {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        match record.kind.as_str() {
            "command" => Self::Command {
                command: record.command.unwrap_or_default(),
            },
            "create_file" => Self::CreateFile {
                path: PathBuf::from(record.path.unwrap_or_default()),
            },
            "write_to_file" => Self::WriteToFile {
                path: PathBuf::from(record.path.unwrap_or_default()),
                content: record.content.unwrap_or_default(),
            },
            _ => Self::Unknown { kind: record.kind },
        }
    }
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        let kind = task.kind().to_string();
        match task {
            Task::Command { command } => Self {
                kind,
                command: Some(command),
                path: None,
                content: None,
            },
            Task::CreateFile { path } => Self {
                kind,
                command: None,
                path: Some(path.to_string_lossy().into_owned()),
                content: None,
            },
            Task::WriteToFile { path, content } => Self {
                kind,
                command: None,
                path: Some(path.to_string_lossy().into_owned()),
                content: Some(content),
            },
            Task::Unknown { .. } => Self {
                kind,
                command: None,
                path: None,
                content: None,
            },
        }
    }
}

/// Exit code reported when a command could not run to completion
/// (spawn failure, timeout, or termination by signal).
pub const FAILED_EXIT_CODE: i32 = -1;

/// Outcome of running one task. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    pub success: bool,
    /// Process exit code; `None` for file tasks.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// Set when the task could not run at all, or was skipped.
    pub error: Option<String>,
}

impl TaskResult {
    pub fn from_exit(exit_code: i32, stdout: String, stderr: String) -> Self {
        Self {
            success: exit_code == 0,
            exit_code: Some(exit_code),
            stdout,
            stderr,
            error: None,
        }
    }

    /// A command that never produced an exit status of its own.
    pub fn aborted(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            exit_code: Some(FAILED_EXIT_CODE),
            stdout: String::new(),
            stderr: message.clone(),
            error: Some(message),
        }
    }

    pub fn file_ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            exit_code: None,
            stdout: message.into(),
            stderr: String::new(),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            error: Some(message.into()),
        }
    }

    pub fn skipped() -> Self {
        Self::failed("skipped: earlier task failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tagged_records_parse_into_variants() {
        let tasks: Vec<Task> = serde_json::from_value(json!([
            {"type": "command", "command": "ls -la"},
            {"type": "create_file", "path": "notes/a.txt"},
            {"type": "write_to_file", "path": "notes/a.txt", "content": "hi"}
        ]))
        .unwrap();

        assert_eq!(
            tasks,
            vec![
                Task::command("ls -la"),
                Task::create_file("notes/a.txt"),
                Task::write_to_file("notes/a.txt", "hi"),
            ]
        );
    }

    #[test]
    fn unrecognised_tag_becomes_unknown() {
        let task: Task = serde_json::from_value(json!({"type": "send_email", "to": "x"})).unwrap();
        assert_eq!(
            task,
            Task::Unknown {
                kind: "send_email".into()
            }
        );
        assert_eq!(task.kind(), "send_email");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let task: Task = serde_json::from_value(json!({"type": "create_file"})).unwrap();
        assert_eq!(task, Task::create_file(""));
    }

    #[test]
    fn serialized_form_uses_type_tag() {
        let value = serde_json::to_value(Task::write_to_file("out.txt", "hello")).unwrap();
        assert_eq!(
            value,
            json!({"type": "write_to_file", "path": "out.txt", "content": "hello"})
        );
    }

    #[test]
    fn as_command_only_for_command_tasks() {
        assert_eq!(Task::command("pwd").as_command(), Some("pwd"));
        assert_eq!(Task::create_file("x").as_command(), None);
    }

    #[test]
    fn exit_status_drives_success() {
        assert!(TaskResult::from_exit(0, "ok".into(), String::new()).success);
        assert!(!TaskResult::from_exit(2, String::new(), "boom".into()).success);
    }

    #[test]
    fn aborted_result_carries_message_in_stderr() {
        let result = TaskResult::aborted("timed out");
        assert!(!result.success);
        assert_eq!(result.exit_code, Some(FAILED_EXIT_CODE));
        assert_eq!(result.stderr, "timed out");
        assert_eq!(result.error.as_deref(), Some("timed out"));
    }
}
