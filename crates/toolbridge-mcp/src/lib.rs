//! Toolbridge MCP server: a fixed tool registry served over session-oriented HTTP.

pub mod config;
pub mod protocol;
pub mod session;
pub mod tools;
pub mod transport;
pub mod types;

pub use config::ServerConfig;
pub use protocol::ProtocolHandler;
pub use session::{SessionId, SessionTransport};
pub use tools::ToolRegistry;
pub use transport::HttpTransport;
