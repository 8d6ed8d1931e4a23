//! Shared fakes for the stage tests: a scripted model client and an
//! in-memory tool-server transport.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};

use conductor::{
    error::{Error, Result},
    model::{ChatMessage, ModelClient, ModelResponse, SamplingParams, ToolCallRequest},
    protocol::{
        JsonRpcError, JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION, METHOD_NOT_FOUND,
    },
    registry::{ToolServerConfig, ToolTransport},
};

/// Model client that replays a fixed sequence of responses and records
/// the messages of every call it receives.
pub struct ScriptedModel {
    script: Mutex<VecDeque<Result<ModelResponse>>>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    pub fn new(responses: Vec<Result<ModelResponse>>) -> Self {
        Self {
            script: Mutex::new(responses.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }

    /// Messages of the `i`-th chat call, in request order.
    pub fn call_messages(&self, i: usize) -> Vec<ChatMessage> {
        self.calls.lock().unwrap()[i].clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        _tools: &[Value],
        _params: &SamplingParams,
    ) -> Result<ModelResponse> {
        self.calls.lock().unwrap().push(messages.to_vec());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted model exhausted")
    }
}

pub fn text_response(text: &str) -> Result<ModelResponse> {
    Ok(ModelResponse {
        content: Some(text.to_string()),
        tool_calls: Vec::new(),
    })
}

pub fn tool_call_response(calls: &[(&str, &str)]) -> Result<ModelResponse> {
    Ok(ModelResponse {
        content: None,
        tool_calls: calls
            .iter()
            .enumerate()
            .map(|(i, (name, arguments))| ToolCallRequest {
                id: format!("call_{i}"),
                name: name.to_string(),
                arguments: arguments.to_string(),
            })
            .collect(),
    })
}

/// One fake tool server: its advertised tools and canned call results.
#[derive(Default)]
pub struct FakeServer {
    pub tools: Vec<(String, String)>,
    pub results: HashMap<String, String>,
    pub unreachable: bool,
}

impl FakeServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tool(mut self, name: &str, description: &str, result: &str) -> Self {
        self.tools.push((name.to_string(), description.to_string()));
        self.results.insert(name.to_string(), result.to_string());
        self
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }
}

/// In-memory transport standing in for HTTP tool servers.
pub struct FakeTransport {
    servers: HashMap<String, FakeServer>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeTransport {
    pub fn new(servers: Vec<(&str, FakeServer)>) -> Self {
        Self {
            servers: servers
                .into_iter()
                .map(|(id, server)| (id.to_string(), server))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// (server id, method) pairs in delivery order.
    pub fn delivered(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolTransport for FakeTransport {
    async fn send(
        &self,
        server: &ToolServerConfig,
        request: JsonRpcRequest,
    ) -> Result<JsonRpcResponse> {
        self.calls
            .lock()
            .unwrap()
            .push((server.id.clone(), request.method.clone()));

        let fake = self
            .servers
            .get(&server.id)
            .expect("unknown fake server id");
        if fake.unreachable {
            return Err(Error::ToolExecution(format!(
                "connection refused: {}",
                server.endpoint
            )));
        }

        let respond = |result: Value| JsonRpcResponse {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: request.id.clone(),
            result: Some(result),
            error: None,
        };

        match request.method.as_str() {
            "initialize" => Ok(respond(json!({"serverInfo": {"name": server.id}}))),
            "tools/list" => {
                let tools: Vec<Value> = fake
                    .tools
                    .iter()
                    .map(|(name, description)| {
                        json!({
                            "name": name,
                            "description": description,
                            "inputSchema": {
                                "type": "object",
                                "properties": {},
                                "required": [],
                            },
                        })
                    })
                    .collect();
                Ok(respond(json!({"tools": tools})))
            }
            "tools/call" => {
                let name = request
                    .params
                    .as_ref()
                    .and_then(|p| p.get("name"))
                    .and_then(|n| n.as_str())
                    .unwrap_or_default();
                match fake.results.get(name) {
                    Some(text) => Ok(respond(json!({
                        "content": [{"type": "text", "text": text}],
                    }))),
                    None => Ok(JsonRpcResponse {
                        jsonrpc: JSONRPC_VERSION.to_string(),
                        id: request.id.clone(),
                        result: None,
                        error: Some(JsonRpcError {
                            code: METHOD_NOT_FOUND,
                            message: format!("unknown tool: {name}"),
                            data: None,
                        }),
                    }),
                }
            }
            other => panic!("unexpected method {other}"),
        }
    }
}
