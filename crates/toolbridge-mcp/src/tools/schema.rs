//! Input schema compilation and argument validation.

use serde_json::Value;

use crate::types::{McpError, McpResult};

/// A tool's compiled input schema.
pub struct InputSchema {
    validator: jsonschema::Validator,
}

impl InputSchema {
    /// Compile `schema` for `tool`. MCP requires object schemas at the top level.
    pub fn compile(tool: &str, schema: &Value) -> McpResult<Self> {
        if schema.get("type").and_then(Value::as_str) != Some("object") {
            return Err(McpError::InvalidSchema {
                tool: tool.to_string(),
                details: "top-level type must be \"object\"".to_string(),
            });
        }

        let validator = jsonschema::validator_for(schema).map_err(|e| McpError::InvalidSchema {
            tool: tool.to_string(),
            details: e.to_string(),
        })?;

        Ok(Self { validator })
    }

    /// Check `args`, reporting every violation in one message.
    pub fn validate(&self, args: &Value) -> Result<(), String> {
        let errors: Vec<String> = self
            .validator
            .iter_errors(args)
            .map(|e| e.to_string())
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("; "))
        }
    }
}
