//! Tool registration and name lookup.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use toolbridge::DocumentSource;

use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition, ToolError};

use super::{GetWeatherTool, InputSchema, ReadGoogleDocTool, Tool};

/// A tool together with its descriptor and compiled schema.
pub struct RegisteredTool {
    definition: ToolDefinition,
    schema: InputSchema,
    handler: Arc<dyn Tool>,
}

impl RegisteredTool {
    pub fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn validate(&self, args: &Value) -> McpResult<()> {
        self.schema
            .validate(args)
            .map_err(|details| McpError::InvalidArguments {
                tool: self.definition.name.clone(),
                details,
            })
    }

    pub async fn invoke(&self, args: Value) -> Result<ToolCallResult, ToolError> {
        self.handler.call(args).await
    }
}

/// Immutable, ordered mapping from tool name to tool.
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

/// Collects tools at startup. A second tool with an already-registered name
/// is rejected.
#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistryBuilder {
    pub fn register(self, tool: impl Tool + 'static) -> McpResult<Self> {
        self.register_arc(Arc::new(tool))
    }

    pub fn register_arc(mut self, handler: Arc<dyn Tool>) -> McpResult<Self> {
        let definition = handler.definition();

        if self.index.contains_key(&definition.name) {
            return Err(McpError::DuplicateTool(definition.name));
        }

        let schema = InputSchema::compile(&definition.name, &definition.input_schema)?;

        tracing::debug!("Registered tool {}", definition.name);
        self.index.insert(definition.name.clone(), self.tools.len());
        self.tools.push(RegisteredTool {
            definition,
            schema,
            handler,
        });
        Ok(self)
    }

    pub fn build(self) -> ToolRegistry {
        ToolRegistry {
            tools: self.tools,
            index: self.index,
        }
    }
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// The shipped tool set: `get_weather` and `read_google_doc`.
    pub fn with_default_tools(
        documents: Arc<dyn DocumentSource>,
        default_document_id: Option<String>,
    ) -> McpResult<Self> {
        Ok(Self::builder()
            .register(GetWeatherTool)?
            .register(ReadGoogleDocTool::new(documents, default_document_id))?
            .build())
    }

    /// Descriptors in registration order.
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition.clone()).collect()
    }

    pub fn resolve(&self, name: &str) -> Option<&RegisteredTool> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
