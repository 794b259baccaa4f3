mod core;
mod execution;
mod interpreter;

pub use core::{ActionLogConfig, Config};
#[cfg(test)]
pub(crate) use core::test_env;
pub use execution::{ExecutionConfig, FailurePolicy};
pub use interpreter::InterpreterConfig;
