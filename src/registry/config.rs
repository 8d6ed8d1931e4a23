use serde::{Deserialize, Serialize};

/// One configured tool server: a stable id and the HTTP endpoint its
/// JSON-RPC methods are posted to. The set of servers is supplied at
/// registry construction, never read from global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolServerConfig {
    pub id: String,
    pub endpoint: String,
}

impl ToolServerConfig {
    pub fn new(id: &str, endpoint: &str) -> Self {
        Self {
            id: id.to_string(),
            endpoint: endpoint.to_string(),
        }
    }
}
