use super::Config;
use crate::error::ConfigError;
use anyhow::{Context, Result};
use directories::UserDirs;
use std::fs;
use std::path::Path;

impl Config {
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        let state_dir = home.join(".echo-gate");

        if !state_dir.exists() {
            fs::create_dir_all(&state_dir).context("Failed to create .echo-gate directory")?;
        }

        Self::load_from(&state_dir.join("config.toml"))
    }

    /// Load an explicit config file, writing defaults there if it does not
    /// exist yet. The state directory is the file's parent directory.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let state_dir = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        let mut config = if config_path.exists() {
            let contents = fs::read_to_string(config_path).with_context(|| {
                format!("Failed to read config file {}", config_path.display())
            })?;
            toml::from_str::<Config>(&contents).map_err(|e| {
                ConfigError::Load(format!("{}: {e}", config_path.display()))
            })?
        } else {
            fs::create_dir_all(&state_dir).context("Failed to create config directory")?;
            let config = Self::default();
            config.write_to(config_path)?;
            tracing::info!(path = %config_path.display(), "wrote default config");
            config
        };

        config.config_path = config_path.to_path_buf();
        config.state_dir = state_dir;
        config.apply_env_overrides();
        config
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.write_to(&self.config_path)
    }

    fn write_to(&self, path: &Path) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, toml_str).context("Failed to write config file")?;
        Ok(())
    }
}
