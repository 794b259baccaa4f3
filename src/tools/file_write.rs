use super::types::TaskResult;
use std::path::Path;

/// Create an empty file, creating parent directories as needed.
/// An existing file is truncated.
pub async fn create_file(path: &Path) -> TaskResult {
    if path.as_os_str().is_empty() {
        return TaskResult::failed("create_file requires a path");
    }

    if let Err(e) = ensure_parent(path).await {
        return TaskResult::failed(format!("Failed to create parent directory: {e}"));
    }

    match tokio::fs::File::create(path).await {
        Ok(_) => TaskResult::file_ok(format!("Created {}", path.display())),
        Err(e) => TaskResult::failed(format!("Failed to create file: {e}")),
    }
}

/// Create or overwrite a file with `content`, creating parent directories.
pub async fn write_to_file(path: &Path, content: &str) -> TaskResult {
    if path.as_os_str().is_empty() {
        return TaskResult::failed("write_to_file requires a path");
    }

    if let Err(e) = ensure_parent(path).await {
        return TaskResult::failed(format!("Failed to create parent directory: {e}"));
    }

    match tokio::fs::write(path, content).await {
        Ok(()) => TaskResult::file_ok(format!(
            "Written {} bytes to {}",
            content.len(),
            path.display()
        )),
        Err(e) => TaskResult::failed(format!("Failed to write file: {e}")),
    }
}

async fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            tokio::fs::create_dir_all(parent).await
        }
        _ => Ok(()),
    }
}
