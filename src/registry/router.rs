//! Tool discovery and routing across configured tool servers.

use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    error::{Error, Result},
    protocol::{JsonRpcRequest, JsonRpcResponse, ToolsCallResult, ToolsListResult},
    registry::{config::ToolServerConfig, transport::ToolTransport},
};

/// One discovered capability and the server that owns it. Immutable for
/// the duration of a discovery cycle.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub server_id: String,
}

impl ToolDescriptor {
    /// Normalize into the function-calling convention the model expects.
    pub fn to_function_schema(&self) -> Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.input_schema,
            }
        })
    }
}

/// Routes named tool invocations to the server that exposes them.
///
/// Holds no cache: every `discover`/`call` cycle is a fresh round-trip,
/// so servers may appear and disappear between invocations. When two
/// servers expose the same name, the first configured server wins.
pub struct ToolRegistry {
    servers: Vec<ToolServerConfig>,
    transport: Arc<dyn ToolTransport>,
}

impl ToolRegistry {
    pub fn new(servers: Vec<ToolServerConfig>, transport: Arc<dyn ToolTransport>) -> Self {
        Self { servers, transport }
    }

    pub fn servers(&self) -> &[ToolServerConfig] {
        &self.servers
    }

    /// Ping every server's `initialize` method. Failures are logged and
    /// skipped, same tolerance as discovery.
    pub async fn initialize(&self) {
        for server in &self.servers {
            match self
                .transport
                .send(server, JsonRpcRequest::initialize())
                .await
            {
                Ok(_) => info!(server = %server.id, "tool server initialized"),
                Err(e) => warn!(server = %server.id, error = %e, "tool server initialize failed"),
            }
        }
    }

    /// Query `tools/list` on every server in parallel and collect the
    /// union of their catalogs. A server that is unreachable or answers
    /// with an error is skipped with a warning; discovery never fails
    /// wholesale for one bad server.
    pub async fn discover(&self) -> Result<Vec<ToolDescriptor>> {
        let listings = join_all(
            self.servers
                .iter()
                .map(|server| self.list_server_tools(server)),
        )
        .await;

        let mut catalog: Vec<ToolDescriptor> = Vec::new();
        for (server, listing) in self.servers.iter().zip(listings) {
            match listing {
                Ok(tools) => {
                    debug!(server = %server.id, count = tools.len(), "discovered tools");
                    for tool in tools {
                        if catalog.iter().any(|t| t.name == tool.name) {
                            warn!(
                                tool = %tool.name,
                                server = %server.id,
                                "duplicate tool name, earlier server keeps ownership"
                            );
                        }
                        catalog.push(tool);
                    }
                }
                Err(e) => {
                    warn!(server = %server.id, error = %e, "skipping server during discovery");
                }
            }
        }

        info!(tools = catalog.len(), "tool discovery complete");
        Ok(catalog)
    }

    async fn list_server_tools(&self, server: &ToolServerConfig) -> Result<Vec<ToolDescriptor>> {
        let response = self
            .transport
            .send(server, JsonRpcRequest::tools_list())
            .await?;
        let result = Self::unwrap_result(server, response)?;
        let listing: ToolsListResult = serde_json::from_value(result)?;

        Ok(listing
            .tools
            .into_iter()
            .map(|spec| ToolDescriptor {
                name: spec.name,
                description: spec.description,
                input_schema: spec.input_schema,
                server_id: server.id.clone(),
            })
            .collect())
    }

    /// Route `name` to its owning server and invoke it. Runs a fresh
    /// discovery cycle; use [`call_with_catalog`](Self::call_with_catalog)
    /// when a catalog from this cycle is already at hand.
    pub async fn call(&self, name: &str, arguments: Value) -> Result<Value> {
        let catalog = self.discover().await?;
        self.call_with_catalog(name, arguments, &catalog).await
    }

    /// Route `name` through an already-discovered catalog: linear scan,
    /// first match wins.
    pub async fn call_with_catalog(
        &self,
        name: &str,
        arguments: Value,
        catalog: &[ToolDescriptor],
    ) -> Result<Value> {
        let descriptor = catalog
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| Error::ToolNotFound(name.to_string()))?;

        let server = self
            .servers
            .iter()
            .find(|s| s.id == descriptor.server_id)
            .ok_or_else(|| Error::ToolNotFound(name.to_string()))?;

        debug!(tool = %name, server = %server.id, "invoking tool");
        let response = self
            .transport
            .send(server, JsonRpcRequest::tools_call(name, arguments))
            .await?;
        let result = Self::unwrap_result(server, response)?;

        // tools/call results carry text content items; anything else is
        // passed through untouched.
        if let Ok(call_result) = serde_json::from_value::<ToolsCallResult>(result.clone())
            && !call_result.content.is_empty()
        {
            return Ok(Value::String(call_result.text()));
        }
        Ok(result)
    }

    /// Which server exposes `name`, if any. Same scan semantics as
    /// `call`, for diagnostics.
    pub async fn owner_of(&self, name: &str) -> Result<Option<String>> {
        let catalog = self.discover().await?;
        Ok(catalog
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.server_id.clone()))
    }

    fn unwrap_result(server: &ToolServerConfig, response: JsonRpcResponse) -> Result<Value> {
        if let Some(error) = response.error {
            return Err(Error::Rpc {
                code: error.code,
                message: format!("{} (server '{}')", error.message, server.id),
            });
        }
        response.result.ok_or_else(|| {
            Error::ToolExecution(format!(
                "server '{}' answered without result or error",
                server.id
            ))
        })
    }
}
