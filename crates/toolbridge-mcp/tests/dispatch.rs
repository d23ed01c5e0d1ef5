//! Dispatch bridge tests: tool resolution, validation, and error surfacing.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use toolbridge::{BridgeError, BridgeResult, DocumentSource};
use toolbridge_mcp::protocol::ProtocolHandler;
use toolbridge_mcp::tools::{Tool, ToolRegistry};
use toolbridge_mcp::types::*;

// ─────────────────────── helpers ───────────────────────

struct FailingDocs(&'static str);

#[async_trait::async_trait]
impl DocumentSource for FailingDocs {
    async fn fetch_document(&self, _id: &str) -> BridgeResult<String> {
        Err(BridgeError::Unavailable(self.0.to_string()))
    }
}

struct StaticDocs;

#[async_trait::async_trait]
impl DocumentSource for StaticDocs {
    async fn fetch_document(&self, id: &str) -> BridgeResult<String> {
        Ok(format!("Guide {id}\nPlan\tPremium"))
    }
}

struct Stuck;

#[async_trait::async_trait]
impl Tool for Stuck {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "stuck".to_string(),
            description: Some("Never returns".to_string()),
            input_schema: json!({"type": "object"}),
        }
    }

    async fn call(&self, _args: Value) -> Result<ToolCallResult, ToolError> {
        futures::future::pending::<()>().await;
        unreachable!()
    }
}

fn handler_with(docs: Arc<dyn DocumentSource>, default_doc: Option<&str>) -> ProtocolHandler {
    let registry = ToolRegistry::with_default_tools(docs, default_doc.map(String::from)).unwrap();
    ProtocolHandler::new(Arc::new(registry))
}

fn handler() -> ProtocolHandler {
    handler_with(Arc::new(StaticDocs), Some("default-doc"))
}

fn call(name: &str, arguments: Value) -> ToolCallParams {
    ToolCallParams {
        name: name.to_string(),
        arguments: Some(arguments),
    }
}

async fn send(handler: &ProtocolHandler, msg: Value) -> Option<Value> {
    let parsed: JsonRpcMessage = serde_json::from_value(msg).unwrap();
    handler.handle_message(parsed).await
}

fn request(id: i64, method: &str, params: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params })
}

// ─────────────────────── tools/call ───────────────────────

#[tokio::test]
async fn weather_for_paris() {
    let result = handler()
        .handle_call_tool(call("get_weather", json!({"city": "Paris"})))
        .await
        .unwrap();

    assert_eq!(
        result.content,
        vec![ToolContent::Text {
            text: "Weather in Paris: Sunny 22°C".to_string()
        }]
    );
    assert_eq!(result.is_error, None);
}

#[tokio::test]
async fn unknown_tool_is_a_protocol_fault() {
    let err = handler()
        .handle_call_tool(call("launch_rockets", json!({})))
        .await
        .unwrap_err();
    assert!(matches!(err, McpError::ToolNotFound(ref name) if name == "launch_rockets"));

    let resp = send(&handler(), request(4, "tools/call", json!({"name": "launch_rockets"})))
        .await
        .unwrap();
    assert_eq!(resp["id"], 4);
    assert_eq!(resp["error"]["code"], -32803);
    assert_eq!(resp["error"]["message"], "Unknown tool: launch_rockets");
}

#[tokio::test]
async fn failing_document_fetch_becomes_error_content() {
    let handler = handler_with(Arc::new(FailingDocs("network error")), None);
    let result = handler
        .handle_call_tool(call("read_google_doc", json!({})))
        .await
        .unwrap();

    assert_eq!(result.joined_text(), "Error: network error");
    assert_eq!(result.is_error, Some(true));

    // Over the wire it is a normal result, not a JSON-RPC error.
    let resp = send(&handler, request(9, "tools/call", json!({"name": "read_google_doc", "arguments": {}})))
        .await
        .unwrap();
    assert!(resp.get("error").is_none(), "got {resp}");
    assert_eq!(resp["result"]["content"][0]["text"], "Error: network error");
}

#[tokio::test]
async fn read_google_doc_returns_document_text() {
    let result = handler()
        .handle_call_tool(call("read_google_doc", json!({"docId": "abc"})))
        .await
        .unwrap();
    assert_eq!(result.joined_text(), "Guide abc\nPlan\tPremium");
}

#[tokio::test]
async fn missing_required_argument_is_rejected() {
    let err = handler()
        .handle_call_tool(call("get_weather", json!({})))
        .await
        .unwrap_err();
    assert!(matches!(err, McpError::InvalidArguments { .. }));
    assert_eq!(err.code(), -32602);
}

#[tokio::test]
async fn wrong_argument_type_is_rejected() {
    let resp = send(
        &handler(),
        request(2, "tools/call", json!({"name": "get_weather", "arguments": {"city": 75001}})),
    )
    .await
    .unwrap();
    assert_eq!(resp["error"]["code"], -32602);
}

#[tokio::test]
async fn absent_arguments_are_treated_as_empty_object() {
    let result = handler()
        .handle_call_tool(ToolCallParams {
            name: "read_google_doc".to_string(),
            arguments: None,
        })
        .await
        .unwrap();
    assert_eq!(result.joined_text(), "Guide default-doc\nPlan\tPremium");
}

#[tokio::test]
async fn stuck_handler_times_out_into_error_content() {
    let registry = ToolRegistry::builder().register(Stuck).unwrap().build();
    let handler = ProtocolHandler::with_timeout(Arc::new(registry), Duration::from_millis(50));

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        handler.handle_call_tool(call("stuck", json!({}))),
    )
    .await
    .expect("timeout must bound the call")
    .unwrap();

    assert_eq!(result.is_error, Some(true));
    assert!(result.joined_text().starts_with("Error: tool call timed out"));
}

// ─────────────────────── other methods ───────────────────────

#[tokio::test]
async fn tools_list_matches_registry() {
    let registry = Arc::new(
        ToolRegistry::with_default_tools(Arc::new(StaticDocs), None).unwrap(),
    );
    let handler = ProtocolHandler::new(registry.clone());

    let resp = send(&handler, request(1, "tools/list", json!({}))).await.unwrap();
    let listed: Vec<ToolDefinition> =
        serde_json::from_value(resp["result"]["tools"].clone()).unwrap();
    assert_eq!(listed, registry.list_tools());

    let weather = &resp["result"]["tools"][0];
    assert_eq!(weather["name"], "get_weather");
    assert_eq!(weather["inputSchema"]["required"], json!(["city"]));
}

#[tokio::test]
async fn initialize_handshake() {
    let handler = handler();
    let resp = send(
        &handler,
        request(
            0,
            "initialize",
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": { "name": "test-client", "version": "1.0" }
            }),
        ),
    )
    .await
    .unwrap();

    assert_eq!(resp["result"]["protocolVersion"], MCP_VERSION);
    assert_eq!(resp["result"]["serverInfo"]["name"], SERVER_NAME);
    assert!(resp["result"]["capabilities"]["tools"].is_object());

    let ack = send(
        &handler,
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
    )
    .await;
    assert!(ack.is_none());
}

#[tokio::test]
async fn initialize_without_params_is_invalid() {
    let resp = send(&handler(), json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"}))
        .await
        .unwrap();
    assert_eq!(resp["error"]["code"], -32602);
}

#[tokio::test]
async fn unknown_method() {
    let resp = send(&handler(), request(5, "resources/list", json!({}))).await.unwrap();
    assert_eq!(resp["error"]["code"], -32601);
}

#[tokio::test]
async fn ping_and_bad_version() {
    let resp = send(&handler(), request(6, "ping", json!({}))).await.unwrap();
    assert_eq!(resp["result"], json!({}));

    let resp = send(&handler(), json!({"jsonrpc": "1.0", "id": 7, "method": "ping"}))
        .await
        .unwrap();
    assert_eq!(resp["error"]["code"], -32600);
}
