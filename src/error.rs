use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `echo-gate`.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide how to answer the user; internal code continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum GateError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Allowlist ───────────────────────────────────────────────────────
    #[error("allowlist: {0}")]
    Allowlist(#[from] AllowlistError),

    // ── Approval gate ───────────────────────────────────────────────────
    #[error("approval: {0}")]
    Approval(#[from] ApprovalError),

    // ── Execution ───────────────────────────────────────────────────────
    #[error("execution: {0}")]
    Execution(#[from] ExecutionError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Allowlist errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AllowlistError {
    #[error("allowlist entry must not be empty")]
    EmptyPrefix,

    #[error("failed to persist allowlist: {0}")]
    Persist(String),
}

// ─── Approval errors ────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApprovalError {
    #[error("nothing pending to approve")]
    NothingPending,

    #[error("pending action is a {pending}, not a {requested}")]
    KindMismatch {
        pending: &'static str,
        requested: &'static str,
    },
}

// ─── Execution errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("command not allowed: {command}")]
    CommandNotAllowed { command: String },

    #[error("script could not be staged: {0}")]
    ScriptIo(#[from] std::io::Error),
}

/// Convenience alias for results carrying a [`GateError`].
pub type Result<T> = std::result::Result<T, GateError>;
