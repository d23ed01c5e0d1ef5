//! Server errors and their JSON-RPC error codes.

use super::message::{JsonRpcError, JsonRpcErrorObject, RequestId, JSONRPC_VERSION};

/// Standard JSON-RPC 2.0 error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// MCP and server-specific error codes.
pub mod mcp_error_codes {
    pub const REQUEST_CANCELLED: i32 = -32800;
    pub const TOOL_NOT_FOUND: i32 = -32803;
    pub const SESSION_NOT_FOUND: i32 = -32851;

    /// Missing or invalid bearer token.
    pub const UNAUTHORIZED: i32 = -32900;
}

#[derive(thiserror::Error, Debug)]
pub enum McpError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Tool arguments do not satisfy the tool's input schema.
    #[error("Invalid arguments for {tool}: {details}")]
    InvalidArguments { tool: String, details: String },

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Request cancelled")]
    RequestCancelled,

    #[error("Unknown tool: {0}")]
    ToolNotFound(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Duplicate tool registration: {0}")]
    DuplicateTool(String),

    #[error("Invalid input schema for {tool}: {details}")]
    InvalidSchema { tool: String, details: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unauthorized")]
    Unauthorized,
}

impl McpError {
    pub fn code(&self) -> i32 {
        use error_codes::*;
        use mcp_error_codes::*;
        match self {
            McpError::ParseError(_) | McpError::Json(_) => PARSE_ERROR,
            McpError::InvalidRequest(_) => INVALID_REQUEST,
            McpError::MethodNotFound(_) => METHOD_NOT_FOUND,
            McpError::InvalidParams(_) | McpError::InvalidArguments { .. } => INVALID_PARAMS,
            McpError::InternalError(_)
            | McpError::DuplicateTool(_)
            | McpError::InvalidSchema { .. }
            | McpError::Transport(_)
            | McpError::Io(_) => INTERNAL_ERROR,
            McpError::RequestCancelled => REQUEST_CANCELLED,
            McpError::ToolNotFound(_) => TOOL_NOT_FOUND,
            McpError::SessionNotFound(_) => SESSION_NOT_FOUND,
            McpError::Unauthorized => UNAUTHORIZED,
        }
    }

    pub fn to_json_rpc_error(&self, id: RequestId) -> JsonRpcError {
        JsonRpcError {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error: JsonRpcErrorObject {
                code: self.code(),
                message: self.to_string(),
                data: None,
            },
        }
    }
}

pub type McpResult<T> = Result<T, McpError>;

/// Failure inside a tool handler.
///
/// Never reaches the client as a protocol fault; the dispatcher turns it
/// into an `Error: <message>` text block.
#[derive(thiserror::Error, Debug)]
pub enum ToolError {
    #[error(transparent)]
    Collaborator(#[from] toolbridge::BridgeError),

    #[error("{0}")]
    Failed(String),

    #[error("tool call timed out after {0:?}")]
    TimedOut(std::time::Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(McpError::ToolNotFound("x".into()).code(), -32803);
        assert_eq!(
            McpError::InvalidArguments {
                tool: "get_weather".into(),
                details: "\"city\" is a required property".into()
            }
            .code(),
            -32602
        );
        assert_eq!(McpError::SessionNotFound("s".into()).code(), -32851);
    }

    #[test]
    fn test_collaborator_message_is_transparent() {
        let err = ToolError::from(toolbridge::BridgeError::Unavailable("network error".into()));
        assert_eq!(err.to_string(), "network error");
    }

    #[test]
    fn test_json_rpc_error_envelope() {
        let err = McpError::MethodNotFound("resources/list".into())
            .to_json_rpc_error(RequestId::Number(3));
        let value = serde_json::to_value(err).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(value["error"]["code"], -32601);
        assert_eq!(value["error"]["message"], "Method not found: resources/list");
    }
}
