use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::{
    error::{Error, Result},
    protocol::{JsonRpcRequest, JsonRpcResponse},
    registry::config::ToolServerConfig,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Delivery of one JSON-RPC request to one tool server. The registry
/// holds this behind a trait so tests can stand in fake servers.
#[async_trait]
pub trait ToolTransport: Send + Sync {
    async fn send(
        &self,
        server: &ToolServerConfig,
        request: JsonRpcRequest,
    ) -> Result<JsonRpcResponse>;
}

pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let http = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self { http })
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl ToolTransport for HttpTransport {
    async fn send(
        &self,
        server: &ToolServerConfig,
        request: JsonRpcRequest,
    ) -> Result<JsonRpcResponse> {
        let response = self
            .http
            .post(&server.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ToolExecution(format!(
                "tool server '{}' returned {status}",
                server.id
            )));
        }

        let parsed: JsonRpcResponse = response.json().await?;
        Ok(parsed)
    }
}
