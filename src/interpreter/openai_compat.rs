//! OpenAI-compatible chat completions client (LM Studio, llama.cpp server,
//! vLLM and friends all speak this format).

use super::Interpreter;
use crate::config::InterpreterConfig;
use crate::tools::{ScriptOs, Task};
use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

const MAX_ERROR_BODY_CHARS: usize = 200;

const TASKS_PROMPT: &str = concat!(
    "You turn a user's request into tasks for their local machine.\n",
    "Respond with a single JSON object and nothing else:\n",
    "{\"tasks\": [<task>, ...]}\n\n",
    "Task types:\n",
    "- {\"type\": \"command\", \"command\": \"<shell command>\"}\n",
    "- {\"type\": \"create_file\", \"path\": \"<path>\"}\n",
    "- {\"type\": \"write_to_file\", \"path\": \"<path>\", \"content\": \"<text>\"}\n\n",
    "Use as few tasks as possible. If the request needs no action, return {\"tasks\": []}.",
);

pub struct OpenAiCompatInterpreter {
    chat_url: String,
    model: String,
    api_key: Option<String>,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TaskReply {
    Wrapped { tasks: Vec<Task> },
    Bare(Vec<Task>),
}

impl OpenAiCompatInterpreter {
    pub fn new(base_url: &str, model: &str, api_key: Option<&str>, timeout: Duration) -> Self {
        let base_url = base_url.trim_end_matches('/');
        let chat_url = if base_url.ends_with("/chat/completions") {
            base_url.to_string()
        } else {
            format!("{base_url}/chat/completions")
        };

        Self {
            chat_url,
            model: model.to_string(),
            api_key: api_key
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(ToString::to_string),
            client: Client::builder()
                .timeout(timeout)
                .connect_timeout(Duration::from_secs(5))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    pub fn from_config(config: &InterpreterConfig) -> Self {
        Self::new(
            &config.base_url,
            &config.model,
            config.api_key.as_deref(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Ask the model for a script that does what `text` describes.
    /// Returns the script body with any code fence removed.
    pub async fn generate_script(&self, text: &str, os: ScriptOs) -> Result<String> {
        let system = match os {
            ScriptOs::Linux => {
                "Write a bash script for the user's request. Reply with only the script."
            }
            ScriptOs::Windows => {
                "Write a PowerShell script for the user's request. Reply with only the script."
            }
        };
        let reply = self.complete(system, text, 0.2).await?;
        let body = strip_code_fence(&reply).trim();
        if body.is_empty() {
            anyhow::bail!("model returned an empty script");
        }
        Ok(body.to_string())
    }

    async fn complete(&self, system: &str, user: &str, temperature: f64) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: system.to_string(),
                },
                Message {
                    role: "user",
                    content: user.to_string(),
                },
            ],
            temperature,
        };

        let mut builder = self.client.post(&self.chat_url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .with_context(|| format!("interpreter request to {} failed", self.chat_url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read error body>".to_string());
            anyhow::bail!("interpreter API error ({status}): {}", truncate_chars(&body));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .context("interpreter returned an unexpected response shape")?;
        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("interpreter returned no message content")
    }
}

impl Interpreter for OpenAiCompatInterpreter {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    fn interpret<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Task>>> + Send + 'a>> {
        Box::pin(async move {
            let reply = self.complete(TASKS_PROMPT, text, 0.0).await?;
            parse_tasks(&reply)
        })
    }
}

/// Parse a model reply into tasks. Accepts `{"tasks": [...]}` or a bare
/// array, optionally inside a code fence or surrounded by prose.
pub fn parse_tasks(reply: &str) -> Result<Vec<Task>> {
    let json = extract_json(reply).context("interpreter reply contains no JSON")?;
    let parsed: TaskReply =
        serde_json::from_str(json).context("interpreter reply is not a task list")?;
    Ok(match parsed {
        TaskReply::Wrapped { tasks } | TaskReply::Bare(tasks) => tasks,
    })
}

fn extract_json(text: &str) -> Option<&str> {
    let fenced = strip_code_fence(text).trim();
    if fenced.starts_with('{') || fenced.starts_with('[') {
        return Some(fenced);
    }

    let open = text.find(['{', '['])?;
    let close = text.rfind(['}', ']'])?;
    (close > open).then(|| &text[open..=close])
}

/// The contents of the first ``` fence, or the whole text when there is none.
fn strip_code_fence(text: &str) -> &str {
    let Some(start) = text.find("```") else {
        return text;
    };
    let after_tag = &text[start + 3..];
    // Skip the language tag line (```json, ```bash, ...).
    let body_start = after_tag.find('\n').map_or(after_tag.len(), |i| i + 1);
    let body = &after_tag[body_start..];
    match body.find("```") {
        Some(end) => &body[..end],
        None => body,
    }
}

fn truncate_chars(input: &str) -> String {
    if input.chars().count() <= MAX_ERROR_BODY_CHARS {
        return input.to_string();
    }
    let end = input
        .char_indices()
        .nth(MAX_ERROR_BODY_CHARS)
        .map_or(input.len(), |(i, _)| i);
    format!("{}...", &input[..end])
}
