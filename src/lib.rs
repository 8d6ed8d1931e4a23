pub mod critic;
pub mod error;
pub mod execute;
pub mod model;
pub mod pipeline;
pub mod plan;
pub mod prompt;
pub mod protocol;
pub mod registry;
pub mod utils;
pub mod verify;

pub use critic::{Critic, CriticOutput};
pub use error::{Error, Result};
pub use execute::{ExecutionResult, Executor, ToolCallRecord};
pub use model::{ModelClient, OpenAiClient, SamplingParams};
pub use pipeline::{Pipeline, PipelineOutput};
pub use plan::{Plan, Planner, Task};
pub use registry::{HttpTransport, ToolDescriptor, ToolRegistry, ToolServerConfig};
pub use verify::{VerificationReport, Verifier};
