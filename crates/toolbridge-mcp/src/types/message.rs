//! JSON-RPC 2.0 envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::McpError;

pub const JSONRPC_VERSION: &str = "2.0";

/// Request identifier: string, number, or null.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(i64),
    Null,
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestId::String(s) => write!(f, "{s}"),
            RequestId::Number(n) => write!(f, "{n}"),
            RequestId::Null => write!(f, "null"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: RequestId,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: RequestId,
    pub result: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub jsonrpc: String,
    pub id: RequestId,
    pub error: JsonRpcErrorObject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A message with no id; never answered.
///
/// Unknown fields are rejected so a request whose `id` is not a valid
/// [`RequestId`] cannot pass for a notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// Any inbound or outbound JSON-RPC message.
///
/// Variant order matters for untagged decoding: a request carries both `id`
/// and `method`, so it must be tried before the notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcMessage {
    Request(JsonRpcRequest),
    Response(JsonRpcResponse),
    Error(JsonRpcError),
    Notification(JsonRpcNotification),
}

/// An inbound body that could not be accepted, with the id to answer under.
#[derive(Debug)]
pub struct RejectedMessage {
    pub id: RequestId,
    pub error: McpError,
}

impl JsonRpcMessage {
    /// Decode an inbound body. Bytes that are not JSON are a parse error;
    /// JSON that is not a JSON-RPC message is an invalid request, answered
    /// under its `id` when that id is usable.
    pub fn decode(bytes: &[u8]) -> Result<Self, RejectedMessage> {
        let value: Value = serde_json::from_slice(bytes).map_err(|e| RejectedMessage {
            id: RequestId::Null,
            error: McpError::ParseError(e.to_string()),
        })?;

        let id = value
            .get("id")
            .and_then(|id| serde_json::from_value(id.clone()).ok())
            .unwrap_or(RequestId::Null);

        serde_json::from_value(value).map_err(|_| RejectedMessage {
            id,
            error: McpError::InvalidRequest("not a valid JSON-RPC 2.0 message".to_string()),
        })
    }

    /// The id a reply to this message would carry, if any.
    pub fn request_id(&self) -> Option<&RequestId> {
        match self {
            JsonRpcMessage::Request(req) => Some(&req.id),
            _ => None,
        }
    }

    /// Method name for requests and notifications.
    pub fn method(&self) -> Option<&str> {
        match self {
            JsonRpcMessage::Request(req) => Some(&req.method),
            JsonRpcMessage::Notification(n) => Some(&n.method),
            _ => None,
        }
    }
}

impl JsonRpcRequest {
    pub fn new(id: RequestId, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

impl JsonRpcResponse {
    pub fn new(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result,
        }
    }
}

impl JsonRpcError {
    pub fn new(id: RequestId, code: i32, message: String) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error: JsonRpcErrorObject {
                code,
                message,
                data: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_vs_notification_decoding() {
        let req: JsonRpcMessage =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 7, "method": "tools/list"}))
                .unwrap();
        assert!(matches!(req, JsonRpcMessage::Request(_)));
        assert_eq!(req.request_id(), Some(&RequestId::Number(7)));

        let notif: JsonRpcMessage = serde_json::from_value(
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        )
        .unwrap();
        assert!(matches!(notif, JsonRpcMessage::Notification(_)));
        assert_eq!(notif.method(), Some("notifications/initialized"));
        assert!(notif.request_id().is_none());
    }

    #[test]
    fn test_decode_tells_parse_errors_from_invalid_requests() {
        let err = JsonRpcMessage::decode(br#"{"broken":"#).unwrap_err();
        assert!(matches!(err.error, McpError::ParseError(_)));

        for body in [
            r#"{"jsonrpc":"2.0","id":1.5,"method":"ping"}"#,
            r#"{"jsonrpc":"2.0","id":true,"method":"ping"}"#,
            r#"{"id":1,"method":"ping"}"#,
            r#"{"jsonrpc":"2.0","id":1,"method":7}"#,
            "[]",
        ] {
            let err = JsonRpcMessage::decode(body.as_bytes()).unwrap_err();
            assert!(matches!(err.error, McpError::InvalidRequest(_)), "{body}");
        }

        let err = JsonRpcMessage::decode(br#"{"id":3,"method":"ping"}"#).unwrap_err();
        assert_eq!(err.id, RequestId::Number(3));
    }

    #[test]
    fn test_string_id_round_trips_verbatim() {
        let req: JsonRpcMessage =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": "abc", "method": "ping"}))
                .unwrap();
        assert_eq!(req.request_id(), Some(&RequestId::String("abc".into())));
    }
}
