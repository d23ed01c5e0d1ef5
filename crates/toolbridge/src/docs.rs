//! Google Docs retrieval behind the [`DocumentSource`] seam.

use serde::Deserialize;

use crate::flatten::extract_text;
use crate::oauth::{AccessTokenProvider, GoogleCredentials};
use crate::types::{BridgeError, BridgeResult, Document};

/// Base URL of the Docs REST API.
pub const GOOGLE_DOCS_API: &str = "https://docs.googleapis.com";

/// Document read when neither the caller nor the configuration names one.
pub const DEFAULT_DOCUMENT_ID: &str = "1GeCvppxgN4xtqSihz7rxpLESeGt5Ei6oLSepqYQarjI";

/// Anything that can produce the plain text of a document.
#[async_trait::async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch_document(&self, document_id: &str) -> BridgeResult<String>;
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

/// Reads documents through `GET /v1/documents/{id}`.
pub struct GoogleDocsClient {
    http: reqwest::Client,
    api_base: String,
    tokens: AccessTokenProvider,
}

impl GoogleDocsClient {
    pub fn new(credentials: GoogleCredentials) -> Self {
        let http = reqwest::Client::new();
        let tokens = AccessTokenProvider::new(http.clone(), credentials);
        Self::with_parts(http, tokens, GOOGLE_DOCS_API)
    }

    /// Build a client against custom endpoints.
    pub fn with_parts(
        http: reqwest::Client,
        tokens: AccessTokenProvider,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            tokens,
        }
    }

    /// Fetch the structured document.
    pub async fn get_document(&self, document_id: &str) -> BridgeResult<Document> {
        validate_document_id(document_id)?;

        let token = self.tokens.access_token().await?;
        let url = format!("{}/v1/documents/{document_id}", self.api_base);

        tracing::debug!("Fetching Google Doc {document_id}");

        let response = self.http.get(&url).bearer_auth(token).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or_default();
            return Err(BridgeError::Api {
                status: status.as_u16(),
                message: if message.is_empty() {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                } else {
                    message
                },
            });
        }

        serde_json::from_str(&body).map_err(|e| BridgeError::Decode(e.to_string()))
    }
}

#[async_trait::async_trait]
impl DocumentSource for GoogleDocsClient {
    async fn fetch_document(&self, document_id: &str) -> BridgeResult<String> {
        let document = self.get_document(document_id).await?;
        let text = extract_text(&document);
        tracing::info!(
            "Fetched Google Doc {document_id} ({} chars)",
            text.chars().count()
        );
        Ok(text)
    }
}

/// Stand-in used when no Google credentials are configured; every fetch
/// fails with [`BridgeError::MissingCredentials`].
pub struct UnconfiguredSource;

#[async_trait::async_trait]
impl DocumentSource for UnconfiguredSource {
    async fn fetch_document(&self, _document_id: &str) -> BridgeResult<String> {
        Err(BridgeError::MissingCredentials)
    }
}

/// Docs ids are URL-safe base64-ish tokens; anything else would alter the path.
fn validate_document_id(document_id: &str) -> BridgeResult<()> {
    if document_id.is_empty() {
        return Err(BridgeError::InvalidInput(
            "document id must not be empty".to_string(),
        ));
    }

    if !document_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(BridgeError::InvalidInput(format!(
            "malformed document id: {document_id}"
        )));
    }

    Ok(())
}
