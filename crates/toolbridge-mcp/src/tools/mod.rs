//! Tools exposed by the server and the registry that holds them.

pub mod get_weather;
pub mod read_google_doc;
pub mod registry;
pub mod schema;

use serde_json::Value;

use crate::types::{ToolCallResult, ToolDefinition, ToolError};

pub use get_weather::GetWeatherTool;
pub use read_google_doc::ReadGoogleDocTool;
pub use registry::{RegisteredTool, ToolRegistry, ToolRegistryBuilder};
pub use schema::InputSchema;

/// A callable tool: a descriptor plus a handler.
///
/// `call` receives arguments that already satisfy the descriptor's input
/// schema.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    async fn call(&self, args: Value) -> Result<ToolCallResult, ToolError>;
}
