//! Dispatch bridge: turns JSON-RPC requests into registry lookups and tool calls.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::tools::ToolRegistry;
use crate::types::*;

use super::negotiation::negotiate;
use super::validator::validate_request;

/// Default upper bound on a single tool invocation.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Lifecycle of one `tools/call`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    Received,
    Resolving,
    Validating,
    Executing,
    Completed,
    Failed,
}

/// Handles the messages of one session. Shares nothing with other sessions
/// apart from the immutable registry.
pub struct ProtocolHandler {
    registry: Arc<ToolRegistry>,
    call_timeout: Duration,
}

impl ProtocolHandler {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self::with_timeout(registry, DEFAULT_CALL_TIMEOUT)
    }

    pub fn with_timeout(registry: Arc<ToolRegistry>, call_timeout: Duration) -> Self {
        Self {
            registry,
            call_timeout,
        }
    }

    /// Handle one inbound message. Requests yield a response envelope,
    /// everything else yields `None`.
    pub async fn handle_message(&self, msg: JsonRpcMessage) -> Option<Value> {
        match msg {
            JsonRpcMessage::Request(req) => Some(self.handle_request(req).await),
            JsonRpcMessage::Notification(notif) => {
                self.handle_notification(notif);
                None
            }
            _ => {
                tracing::warn!("Received unexpected message type from client");
                None
            }
        }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> Value {
        if let Err(e) = validate_request(&request) {
            return serde_json::to_value(e.to_json_rpc_error(request.id)).unwrap_or_default();
        }

        let id = request.id.clone();
        match self.dispatch_request(request).await {
            Ok(value) => serde_json::to_value(JsonRpcResponse::new(id, value)).unwrap_or_default(),
            Err(e) => {
                tracing::debug!("Request {id} failed: {e}");
                serde_json::to_value(e.to_json_rpc_error(id)).unwrap_or_default()
            }
        }
    }

    async fn dispatch_request(&self, request: JsonRpcRequest) -> McpResult<Value> {
        match request.method.as_str() {
            "initialize" => {
                let params: InitializeParams = parse_params(request.params, "Initialize")?;
                to_value(negotiate(&params))
            }
            "ping" => Ok(Value::Object(serde_json::Map::new())),

            "tools/list" => to_value(ToolListResult {
                tools: self.handle_list_tools(),
                next_cursor: None,
            }),
            "tools/call" => {
                let params: ToolCallParams = parse_params(request.params, "Tool call")?;
                to_value(self.handle_call_tool(params).await?)
            }

            _ => Err(McpError::MethodNotFound(request.method)),
        }
    }

    fn handle_notification(&self, notification: JsonRpcNotification) {
        match notification.method.as_str() {
            "notifications/initialized" | "initialized" => {
                tracing::debug!("MCP handshake complete");
            }
            "notifications/cancelled" => {
                let reason = notification
                    .params
                    .and_then(|p| serde_json::from_value::<CancelledParams>(p).ok())
                    .and_then(|p| p.reason);
                // Calls within a session run one at a time, so by the time this
                // is read the referenced call has already finished.
                tracing::info!(
                    "Client cancelled a request: {}",
                    reason.as_deref().unwrap_or("no reason given")
                );
            }
            other => {
                tracing::debug!("Unknown notification: {other}");
            }
        }
    }

    /// The registry's descriptors, unmodified.
    pub fn handle_list_tools(&self) -> Vec<ToolDefinition> {
        self.registry.list_tools()
    }

    /// Resolve, validate, and run a tool.
    ///
    /// Unknown tools and schema violations are protocol faults. Handler
    /// failures and timeouts come back as `Ok` with `Error: ...` content.
    pub async fn handle_call_tool(&self, params: ToolCallParams) -> McpResult<ToolCallResult> {
        let name = params.name;
        let mut phase = CallPhase::Received;
        tracing::debug!(tool = %name, ?phase, "tools/call");

        phase = CallPhase::Resolving;
        let Some(tool) = self.registry.resolve(&name) else {
            tracing::warn!(tool = %name, ?phase, "Unknown tool");
            return Err(McpError::ToolNotFound(name));
        };

        phase = CallPhase::Validating;
        let args = match params.arguments {
            None | Some(Value::Null) => Value::Object(serde_json::Map::new()),
            Some(args) => args,
        };
        if let Err(e) = tool.validate(&args) {
            tracing::warn!(tool = %name, ?phase, "Rejected arguments: {e}");
            return Err(e);
        }

        phase = CallPhase::Executing;
        tracing::debug!(tool = %name, ?phase, "Invoking handler");
        let outcome = match tokio::time::timeout(self.call_timeout, tool.invoke(args)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ToolError::TimedOut(self.call_timeout)),
        };

        match outcome {
            Ok(result) => {
                phase = CallPhase::Completed;
                tracing::debug!(tool = %name, ?phase, "Tool call completed");
                Ok(result)
            }
            Err(e) => {
                phase = CallPhase::Failed;
                tracing::warn!(tool = %name, ?phase, "Tool handler failed: {e}");
                Ok(ToolCallResult::error(e))
            }
        }
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(params: Option<Value>, what: &str) -> McpResult<T> {
    params
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| McpError::InvalidParams(e.to_string()))?
        .ok_or_else(|| McpError::InvalidParams(format!("{what} params required")))
}

fn to_value(value: impl serde::Serialize) -> McpResult<Value> {
    serde_json::to_value(value).map_err(|e| McpError::InternalError(e.to_string()))
}
