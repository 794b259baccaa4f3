use super::process::Invocation;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Target platform of a generated script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptOs {
    #[default]
    Linux,
    Windows,
}

impl ScriptOs {
    /// The platform this process runs on.
    pub fn host() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Linux
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "linux" | "unix" | "sh" | "bash" => Some(Self::Linux),
            "windows" | "win" | "powershell" | "ps1" => Some(Self::Windows),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Windows => "windows",
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Self::Linux => "sh",
            Self::Windows => "ps1",
        }
    }
}

/// A generated script waiting for approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub id: String,
    pub os: ScriptOs,
    pub body: String,
}

impl Script {
    pub fn new(os: ScriptOs, body: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            os,
            body: body.into(),
        }
    }

    /// Lines that will execute: everything except blanks and `#` lines
    /// (comments in both sh and PowerShell, shebang included). Each one is
    /// checked against the allowlist.
    pub fn command_lines(&self) -> Vec<&str> {
        self.body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| !line.starts_with('#'))
            .collect()
    }

    /// Write the body to `<dir>/<id>.<ext>` and return the path.
    pub fn stage(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.{}", self.id, self.os.extension()));
        std::fs::write(&path, &self.body)?;
        Ok(path)
    }

    /// How to run a staged copy of this script.
    pub fn invocation(&self, staged: &Path, linux_shell: &str) -> Invocation {
        let staged = staged.to_string_lossy().into_owned();
        match self.os {
            ScriptOs::Linux => Invocation {
                program: linux_shell.to_string(),
                args: vec![staged],
                working_dir: None,
            },
            ScriptOs::Windows => Invocation {
                program: "powershell".to_string(),
                args: vec![
                    "-NoProfile".to_string(),
                    "-ExecutionPolicy".to_string(),
                    "Bypass".to_string(),
                    "-File".to_string(),
                    staged,
                ],
                working_dir: None,
            },
        }
    }
}
