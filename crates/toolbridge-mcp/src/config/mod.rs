//! Configuration loading and resolution.

use std::path::PathBuf;
use std::time::Duration;

use crate::session::TransportConfig;
use crate::types::{McpError, McpResult};

pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_ENDPOINT: &str = "/mcp";
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_QUEUE_DEPTH: usize = 32;

/// Everything the server needs at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: String,
    pub endpoint: String,
    pub call_timeout: Duration,
    pub queue_depth: usize,
    pub token: Option<String>,
    pub default_document_id: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            call_timeout: Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
            queue_depth: DEFAULT_QUEUE_DEPTH,
            token: None,
            default_document_id: None,
        }
    }
}

impl ServerConfig {
    /// Normalize and check values that clap cannot.
    pub fn validated(mut self) -> McpResult<Self> {
        let endpoint = self.endpoint.trim().trim_end_matches('/');
        if endpoint.is_empty() {
            return Err(McpError::InvalidParams(
                "endpoint must not be the root path".to_string(),
            ));
        }
        self.endpoint = if endpoint.starts_with('/') {
            endpoint.to_string()
        } else {
            format!("/{endpoint}")
        };

        if self.endpoint == "/health" {
            return Err(McpError::InvalidParams(
                "endpoint /health is reserved for the health check".to_string(),
            ));
        }
        if self.call_timeout.is_zero() {
            return Err(McpError::InvalidParams(
                "call timeout must be positive".to_string(),
            ));
        }
        if self.queue_depth == 0 {
            return Err(McpError::InvalidParams(
                "queue depth must be at least 1".to_string(),
            ));
        }

        self.token = self.token.filter(|t| !t.trim().is_empty());
        self.default_document_id = self.default_document_id.filter(|d| !d.trim().is_empty());
        Ok(self)
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            endpoint: self.endpoint.clone(),
            queue_depth: self.queue_depth,
            call_timeout: self.call_timeout,
        }
    }
}

/// Load `.env` from the working directory or its parents, if present.
/// Variables already set in the environment are left untouched.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_normalization() {
        let config = ServerConfig {
            endpoint: "mcp/".to_string(),
            ..Default::default()
        }
        .validated()
        .unwrap();
        assert_eq!(config.endpoint, "/mcp");
    }

    #[test]
    fn test_rejects_reserved_and_degenerate_values() {
        for endpoint in ["/", "", "/health"] {
            let config = ServerConfig {
                endpoint: endpoint.to_string(),
                ..Default::default()
            };
            assert!(config.validated().is_err(), "accepted {endpoint:?}");
        }

        let config = ServerConfig {
            call_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validated().is_err());
    }

    #[test]
    fn test_blank_token_means_no_auth() {
        let config = ServerConfig {
            token: Some("   ".to_string()),
            ..Default::default()
        }
        .validated()
        .unwrap();
        assert!(config.token.is_none());
    }
}
