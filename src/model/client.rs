//! Completion-endpoint abstraction.
//!
//! The orchestration stages treat the model as a black box: given
//! messages, optional tool schemas and sampling parameters, it returns
//! text and/or tool-call requests. Stages hold a `dyn ModelClient` so
//! tests can script responses without any network.

use async_trait::async_trait;
use serde::{
    Deserialize, Serialize, Serializer,
    ser::SerializeStruct,
};
use serde_json::Value;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallRequest>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self::plain("system", content)
    }

    pub fn user(content: &str) -> Self {
        Self::plain("user", content)
    }

    pub fn assistant(content: &str) -> Self {
        Self::plain("assistant", content)
    }

    /// An assistant turn that carries tool-call requests, echoed back to
    /// the model when feeding it the corresponding results.
    pub fn assistant_tool_calls(calls: Vec<ToolCallRequest>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: String::new(),
            tool_calls: Some(calls),
            tool_call_id: None,
        }
    }

    /// A tool-result turn answering the call identified by `call_id`.
    pub fn tool_result(call_id: &str, content: &str) -> Self {
        Self {
            role: "tool".to_string(),
            content: content.to_string(),
            tool_calls: None,
            tool_call_id: Some(call_id.to_string()),
        }
    }

    fn plain(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

/// A tool-call request issued by the model. `arguments` arrives as a
/// JSON string per the function-calling convention and must be decoded
/// explicitly before use.
#[derive(Debug, Clone)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

/// On the wire a tool call nests name/arguments under a `function`
/// envelope: `{id, type:"function", function:{name, arguments}}`.
/// Echoing the flat struct instead is rejected by OpenAI-compatible
/// endpoints, so serialization owns the nesting.
impl Serialize for ToolCallRequest {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("ToolCallRequest", 3)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("type", "function")?;
        state.serialize_field(
            "function",
            &serde_json::json!({
                "name": self.name,
                "arguments": self.arguments,
            }),
        )?;
        state.end()
    }
}

impl ToolCallRequest {
    pub fn decode_arguments(&self) -> Result<Value> {
        if self.arguments.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        serde_json::from_str(&self.arguments).map_err(|e| {
            Error::ToolExecution(format!(
                "tool call '{}' carried malformed arguments: {e}",
                self.name
            ))
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: 4096,
            top_p: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModelResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
}

impl ModelResponse {
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Stateless completion client; each call is an independent request.
///
/// `tools` are advertised in the function-calling convention:
/// `{type:"function", function:{name, description, parameters}}`.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[Value],
        params: &SamplingParams,
    ) -> Result<ModelResponse>;
}
