//! Collaborators behind the Toolbridge MCP server: Google Docs retrieval,
//! document text flattening and the canned weather report.

pub mod docs;
pub mod flatten;
pub mod oauth;
pub mod types;
pub mod weather;

pub use docs::{DocumentSource, GoogleDocsClient, UnconfiguredSource, DEFAULT_DOCUMENT_ID};
pub use flatten::extract_text;
pub use oauth::{AccessTokenProvider, GoogleCredentials};
pub use types::*;
pub use weather::weather_report;
