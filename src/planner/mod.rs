mod builder;
mod executor;
pub mod heuristic;
mod types;

pub use builder::PlanBuilder;
pub use executor::PlanExecutor;
pub use types::{Plan, PlanStatus, TrustLevel};
