use anyhow::Result;
use serde::{Deserialize, Serialize};

/// OpenAI-compatible endpoint used to turn user text into tasks.
/// LM Studio serves this API on port 1234 by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpreterConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:1234/v1".into()
}

fn default_model() -> String {
    "local-model".into()
}

fn default_timeout_secs() -> u64 {
    20
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl InterpreterConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.enabled && self.base_url.trim().is_empty() {
            anyhow::bail!("interpreter.base_url must be set when the interpreter is enabled");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("interpreter.timeout_secs must be greater than 0");
        }
        Ok(())
    }
}
