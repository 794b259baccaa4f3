//! Turning free-form user text into tasks with a language model.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatInterpreter;

use crate::config::InterpreterConfig;
use crate::tools::Task;
use anyhow::Result;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boundary to whatever model proposes tasks.
///
/// Callers treat every failure as "no suggestion": an error or an empty list
/// sends the text to the heuristic fallback.
pub trait Interpreter: Send + Sync {
    fn name(&self) -> &str;

    fn interpret<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Task>>> + Send + 'a>>;
}

/// Never proposes anything.
pub struct NoopInterpreter;

impl Interpreter for NoopInterpreter {
    fn name(&self) -> &str {
        "noop"
    }

    fn interpret<'a>(
        &'a self,
        _text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Task>>> + Send + 'a>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}

/// The interpreter selected by `[interpreter]`.
pub fn from_config(config: &InterpreterConfig) -> Arc<dyn Interpreter> {
    if config.enabled {
        Arc::new(OpenAiCompatInterpreter::from_config(config))
    } else {
        Arc::new(NoopInterpreter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_returns_no_tasks() {
        let tasks = NoopInterpreter.interpret("list files").await.unwrap();
        assert!(tasks.is_empty());
    }

    #[test]
    fn disabled_config_selects_noop() {
        let interpreter = from_config(&InterpreterConfig::default());
        assert_eq!(interpreter.name(), "noop");
    }

    #[test]
    fn enabled_config_selects_http_interpreter() {
        let config = InterpreterConfig {
            enabled: true,
            ..InterpreterConfig::default()
        };
        assert_eq!(from_config(&config).name(), "openai-compatible");
    }
}
