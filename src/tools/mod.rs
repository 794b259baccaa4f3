pub mod file_write;
pub mod process;
pub mod runner;
pub mod script;
pub mod types;

pub use process::{HostSpawner, Invocation, ProcessSpawner};
pub use runner::TaskRunner;
pub use script::{Script, ScriptOs};
pub use types::{FAILED_EXIT_CODE, Task, TaskResult};
