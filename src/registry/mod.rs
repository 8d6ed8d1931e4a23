pub mod config;
pub mod router;
pub mod transport;

pub use config::ToolServerConfig;
pub use router::{ToolDescriptor, ToolRegistry};
pub use transport::{HttpTransport, ToolTransport};
