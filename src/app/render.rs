use echo_gate::audit::{LogEntry, LoggedAction, LoggedResult};
use echo_gate::session::Outcome;
use echo_gate::tools::TaskResult;
use std::fmt::Write as _;

const MAX_PREVIEW_LINES: usize = 20;

pub fn task_result(label: &str, result: &TaskResult) -> String {
    let status = if result.success { "ok" } else { "FAILED" };
    let mut out = match result.exit_code {
        Some(code) => format!("[{status}] {label} (exit {code})"),
        None => format!("[{status}] {label}"),
    };
    if let Some(error) = &result.error {
        let _ = write!(out, "\n  error: {error}");
    }
    for (name, stream) in [("stdout", &result.stdout), ("stderr", &result.stderr)] {
        if stream.trim().is_empty() || result.error.as_deref() == Some(stream.as_str()) {
            continue;
        }
        let _ = write!(out, "\n  {name}:");
        for line in preview(stream) {
            let _ = write!(out, "\n    {line}");
        }
    }
    out
}

pub fn outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Plan { plan, results } => {
            let mut out = format!("Executed plan {}", plan.id);
            for (index, (task, result)) in plan.tasks.iter().zip(results).enumerate() {
                let label = format!("{}. {}", index + 1, task.summary());
                let _ = write!(out, "\n{}", task_result(&label, result));
            }
            out
        }
        Outcome::Command { command, result } => {
            task_result(&format!("{} `{}`", command.summary, command.command), result)
        }
        Outcome::Script { script, result } => {
            task_result(&format!("{} script {}", script.os.as_str(), script.id), result)
        }
    }
}

pub fn log_entry(entry: &LogEntry) -> String {
    let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S");
    let what = match &entry.action {
        LoggedAction::Plan(plan) => format!("plan \"{}\" ({} tasks)", plan.description, plan.tasks.len()),
        LoggedAction::Command(parsed) => format!("command `{}`", parsed.command),
        LoggedAction::Script(script) => format!("{} script {}", script.os.as_str(), script.id),
    };
    let (ok, total) = match &entry.result {
        LoggedResult::Many(results) => (results.iter().filter(|r| r.success).count(), results.len()),
        LoggedResult::Single(result) => (usize::from(result.success), 1),
    };
    format!("{timestamp}  {what}  {ok}/{total} ok")
}

fn preview(stream: &str) -> impl Iterator<Item = &str> {
    let lines: Vec<&str> = stream.trim_end().lines().collect();
    let hidden = lines.len().saturating_sub(MAX_PREVIEW_LINES);
    let marker = (hidden > 0).then_some("...");
    marker
        .into_iter()
        .chain(lines.into_iter().skip(hidden))
}
