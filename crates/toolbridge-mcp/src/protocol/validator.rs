//! JSON-RPC envelope validation.

use crate::types::{JsonRpcRequest, McpError, McpResult, JSONRPC_VERSION};

/// Reject requests that are not well-formed JSON-RPC 2.0.
pub fn validate_request(request: &JsonRpcRequest) -> McpResult<()> {
    if request.jsonrpc != JSONRPC_VERSION {
        return Err(McpError::InvalidRequest(format!(
            "Expected jsonrpc version \"{JSONRPC_VERSION}\", got \"{}\"",
            request.jsonrpc
        )));
    }

    if request.method.is_empty() {
        return Err(McpError::InvalidRequest(
            "Method name must not be empty".to_string(),
        ));
    }

    if let Some(params) = &request.params {
        if !params.is_object() && !params.is_array() {
            return Err(McpError::InvalidRequest(
                "params must be an object or an array".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RequestId;
    use serde_json::json;

    #[test]
    fn test_wrong_version() {
        let mut req = JsonRpcRequest::new(RequestId::Number(1), "ping", None);
        req.jsonrpc = "1.0".into();
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn test_scalar_params() {
        let req = JsonRpcRequest::new(RequestId::Number(1), "tools/call", Some(json!(5)));
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn test_ok() {
        let req = JsonRpcRequest::new(RequestId::Number(1), "tools/list", Some(json!({})));
        assert!(validate_request(&req).is_ok());
    }
}
