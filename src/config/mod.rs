pub mod schema;

pub use schema::{ActionLogConfig, Config, ExecutionConfig, FailurePolicy, InterpreterConfig};
#[cfg(test)]
pub(crate) use schema::test_env;
