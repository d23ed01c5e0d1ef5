//! Tool: read_google_doc: fetch a Google Doc as plain text.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use toolbridge::{DocumentSource, DEFAULT_DOCUMENT_ID};

use crate::types::{ToolCallResult, ToolDefinition, ToolError};

use super::Tool;

#[derive(Debug, Deserialize)]
struct ReadDocParams {
    #[serde(default, rename = "docId")]
    doc_id: Option<String>,
}

pub struct ReadGoogleDocTool {
    documents: Arc<dyn DocumentSource>,
    default_document_id: Option<String>,
}

impl ReadGoogleDocTool {
    pub fn new(documents: Arc<dyn DocumentSource>, default_document_id: Option<String>) -> Self {
        Self {
            documents,
            default_document_id,
        }
    }

    /// The call's `docId`, else the configured default, else the built-in one.
    fn document_id(&self, params: ReadDocParams) -> String {
        params
            .doc_id
            .filter(|id| !id.trim().is_empty())
            .or_else(|| self.default_document_id.clone())
            .unwrap_or_else(|| DEFAULT_DOCUMENT_ID.to_string())
    }
}

#[async_trait::async_trait]
impl Tool for ReadGoogleDocTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "read_google_doc".to_string(),
            description: Some(
                "Read a Google Doc and return its text. Paragraphs are separated by newlines \
                 and table cells by tabs. Reads the default document when docId is omitted."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "docId": { "type": "string" }
                }
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<ToolCallResult, ToolError> {
        let params: ReadDocParams =
            serde_json::from_value(args).map_err(|e| ToolError::Failed(e.to_string()))?;
        let document_id = self.document_id(params);

        let text = self.documents.fetch_document(&document_id).await?;
        Ok(ToolCallResult::text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use toolbridge::{BridgeError, BridgeResult};

    /// Records requested ids and answers with fixed text.
    #[derive(Default)]
    struct Recorder {
        requested: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl DocumentSource for Recorder {
        async fn fetch_document(&self, id: &str) -> BridgeResult<String> {
            self.requested.lock().unwrap().push(id.to_string());
            Ok(format!("text of {id}"))
        }
    }

    struct Failing;

    #[async_trait::async_trait]
    impl DocumentSource for Failing {
        async fn fetch_document(&self, _id: &str) -> BridgeResult<String> {
            Err(BridgeError::Unavailable("network error".to_string()))
        }
    }

    #[tokio::test]
    async fn test_explicit_doc_id_wins() {
        let source = Arc::new(Recorder::default());
        let tool = ReadGoogleDocTool::new(source.clone(), Some("default".into()));
        let result = tool.call(json!({"docId": "abc"})).await.unwrap();
        assert_eq!(result.joined_text(), "text of abc");
        assert_eq!(*source.requested.lock().unwrap(), vec!["abc".to_string()]);
    }

    #[tokio::test]
    async fn test_falls_back_to_default_document() {
        let source = Arc::new(Recorder::default());
        let tool = ReadGoogleDocTool::new(source.clone(), Some("default".into()));
        tool.call(json!({})).await.unwrap();
        tool.call(json!({"docId": "  "})).await.unwrap();
        assert_eq!(
            *source.requested.lock().unwrap(),
            vec!["default".to_string(), "default".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unconfigured_default_uses_builtin_document() {
        let source = Arc::new(Recorder::default());
        let tool = ReadGoogleDocTool::new(source.clone(), None);
        tool.call(json!({})).await.unwrap();
        assert_eq!(
            *source.requested.lock().unwrap(),
            vec![DEFAULT_DOCUMENT_ID.to_string()]
        );
    }

    #[tokio::test]
    async fn test_collaborator_failure_propagates_as_tool_error() {
        let tool = ReadGoogleDocTool::new(Arc::new(Failing), None);
        let err = tool.call(json!({})).await.unwrap_err();
        assert_eq!(err.to_string(), "network error");
    }
}
