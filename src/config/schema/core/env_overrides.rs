use super::Config;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(timeout_str) = std::env::var("ECHO_GATE_COMMAND_TIMEOUT")
            && let Ok(timeout) = timeout_str.parse::<u64>()
            && timeout > 0
        {
            self.execution.command_timeout_secs = timeout;
        }

        if let Ok(shell) = std::env::var("ECHO_GATE_SHELL")
            && !shell.is_empty()
        {
            self.execution.shell = shell;
        }

        if let Ok(url) = std::env::var("ECHO_GATE_INTERPRETER_URL")
            && !url.is_empty()
        {
            self.interpreter.base_url = url;
            self.interpreter.enabled = true;
        }

        if let Ok(model) = std::env::var("ECHO_GATE_INTERPRETER_MODEL")
            && !model.is_empty()
        {
            self.interpreter.model = model;
        }

        if let Ok(key) = std::env::var("ECHO_GATE_API_KEY")
            && !key.is_empty()
        {
            self.interpreter.api_key = Some(key);
        }
    }
}
