use crate::tools::Task;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Pending,
    Approved,
    Executed,
    Rejected,
}

/// How much the plan's origin should be trusted. Shown to the user next to
/// the plan; nothing gates on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustLevel {
    Low,
    Medium,
    High,
}

impl TrustLevel {
    /// Anything that reaches the shell is `Low`; pure file edits are `Medium`.
    pub fn for_tasks(tasks: &[Task]) -> Self {
        if tasks.iter().any(|task| task.as_command().is_some()) {
            Self::Low
        } else {
            Self::Medium
        }
    }
}

/// An ordered list of tasks derived from one piece of user text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub description: String,
    pub tasks: Vec<Task>,
    pub trust: TrustLevel,
    pub status: PlanStatus,
    pub created_at: DateTime<Utc>,
}

impl Plan {
    /// A fresh `pending` plan.
    pub fn new(description: impl Into<String>, tasks: Vec<Task>) -> Self {
        let trust = TrustLevel::for_tasks(&tasks);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            description: description.into(),
            tasks,
            trust,
            status: PlanStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Command lines in task order.
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().filter_map(Task::as_command)
    }

    pub fn render_summary(&self) -> String {
        let mut out = format!("Plan {} ({:?} trust): {}", self.id, self.trust, self.description);
        for (index, task) in self.tasks.iter().enumerate() {
            out.push_str(&format!("\n  {}. {}", index + 1, task.summary()));
        }
        out
    }
}
