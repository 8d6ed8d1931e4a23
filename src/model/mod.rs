pub mod client;
pub mod openai;

pub use client::{ChatMessage, ModelClient, ModelResponse, SamplingParams, ToolCallRequest};
pub use openai::{OpenAiClient, OpenAiConfig};
