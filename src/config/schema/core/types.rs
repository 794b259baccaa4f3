use super::super::{ExecutionConfig, InterpreterConfig};
use anyhow::Result;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// State directory (logs, staged scripts) - computed from home, not serialized
    #[serde(skip)]
    pub state_dir: PathBuf,
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Command prefixes permitted to execute. Matching is a plain
    /// case-sensitive `starts_with`.
    #[serde(default = "default_allowlist")]
    pub allowlist: Vec<String>,

    #[serde(default)]
    pub execution: ExecutionConfig,

    #[serde(default)]
    pub interpreter: InterpreterConfig,

    #[serde(default)]
    pub action_log: ActionLogConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionLogConfig {
    /// Overrides `<state_dir>/logs/actions.json`. Supports `~`.
    #[serde(default)]
    pub path: Option<String>,
}

fn default_allowlist() -> Vec<String> {
    vec![
        "ls".into(),
        "echo".into(),
        "cat".into(),
        "pwd".into(),
        "whoami".into(),
        "date".into(),
    ]
}

impl Default for Config {
    fn default() -> Self {
        let home =
            UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());
        let state_dir = home.join(".echo-gate");

        Self {
            config_path: state_dir.join("config.toml"),
            state_dir,
            allowlist: default_allowlist(),
            execution: ExecutionConfig::default(),
            interpreter: InterpreterConfig::default(),
            action_log: ActionLogConfig::default(),
        }
    }
}

impl Config {
    /// Where the action log lives, honouring `[action_log] path`.
    pub fn action_log_path(&self) -> PathBuf {
        match self.action_log.path.as_deref() {
            Some(path) if !path.trim().is_empty() => {
                PathBuf::from(shellexpand::tilde(path.trim()).into_owned())
            }
            _ => self.state_dir.join("logs").join("actions.json"),
        }
    }

    /// Directory where approved scripts are staged before running.
    pub fn scripts_dir(&self) -> PathBuf {
        self.state_dir.join("scripts")
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(index) = self
            .allowlist
            .iter()
            .position(|entry| entry.trim().is_empty())
        {
            anyhow::bail!("allowlist[{index}] must not be empty");
        }
        self.execution.validate()?;
        self.interpreter.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.allowlist.iter().any(|entry| entry == "echo"));
    }

    #[test]
    fn empty_allowlist_entry_is_rejected() {
        let config = Config {
            allowlist: vec!["ls".into(), "  ".into()],
            ..Config::default()
        };
        let err = config.validate().unwrap_err().to_string();
        assert_eq!(err, "allowlist[1] must not be empty");
    }

    #[test]
    fn action_log_path_defaults_under_state_dir() {
        let config = Config {
            state_dir: PathBuf::from("/var/lib/echo-gate"),
            ..Config::default()
        };
        assert_eq!(
            config.action_log_path(),
            PathBuf::from("/var/lib/echo-gate/logs/actions.json")
        );
    }

    #[test]
    fn action_log_path_override_is_used() {
        let config = Config {
            action_log: ActionLogConfig {
                path: Some("/tmp/audit.json".into()),
            },
            ..Config::default()
        };
        assert_eq!(config.action_log_path(), PathBuf::from("/tmp/audit.json"));
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config: Config = toml::from_str("allowlist = [\"git\"]").unwrap();
        assert_eq!(config.allowlist, vec!["git".to_string()]);
        assert_eq!(config.execution.command_timeout_secs, 30);
        assert!(!config.interpreter.enabled);
    }
}
