//! Rule-based fallback used when no interpreter suggestion is available.

use crate::tools::Task;

const CREATE_PREFIX: &str = "create a file named ";
const WRITE_JOINER: &str = " and write ";

/// Map raw text to tasks. Always returns at least one task.
///
/// - `{"command": "..."}` becomes that command.
/// - `create a file named <path> and write '<content>'` becomes a
///   `create_file` followed by a `write_to_file`.
/// - Anything else is run verbatim as a shell command.
pub fn tasks_for(text: &str) -> Vec<Task> {
    if let Some(command) = json_command(text) {
        return vec![Task::command(command)];
    }

    if let Some((path, content)) = create_and_write(text) {
        return vec![
            Task::create_file(path),
            Task::write_to_file(path, content),
        ];
    }

    vec![Task::command(text)]
}

fn json_command(text: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(text.trim()).ok()?;
    value
        .get("command")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|command| !command.is_empty())
        .map(ToString::to_string)
}

fn create_and_write(text: &str) -> Option<(&str, &str)> {
    // ASCII lowercasing keeps byte offsets aligned with `text`.
    let lower = text.to_ascii_lowercase();

    let path_start = lower.find(CREATE_PREFIX)? + CREATE_PREFIX.len();
    let path_len = lower[path_start..].find(WRITE_JOINER)?;
    let path = unwrap_path(text[path_start..path_start + path_len].trim());
    if path.is_empty() {
        return None;
    }

    let quoted = text[path_start + path_len + WRITE_JOINER.len()..].trim_start();
    let quote = quoted.chars().next().filter(|c| matches!(c, '\'' | '"'))?;
    let inner = &quoted[1..];
    // Last matching quote, so apostrophes inside the content survive.
    let end = inner.rfind(quote)?;
    Some((path, &inner[..end]))
}

fn unwrap_path(path: &str) -> &str {
    for wrapper in ['`', '\'', '"'] {
        if let Some(inner) = path
            .strip_prefix(wrapper)
            .and_then(|rest| rest.strip_suffix(wrapper))
        {
            return inner.trim();
        }
    }
    path
}
