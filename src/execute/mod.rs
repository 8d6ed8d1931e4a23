pub mod executor;
pub mod model;

pub use executor::Executor;
pub use model::{DependencyResults, ExecutionResult, ToolCallRecord, ToolInvocation};
