//! Google OAuth2 credentials and access-token refresh.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::Mutex;

use crate::types::{BridgeError, BridgeResult};

/// Google's OAuth2 token endpoint.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Refresh this long before the reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

/// Credentials used to authorize Docs API calls.
#[derive(Clone)]
pub enum GoogleCredentials {
    /// Long-lived refresh credential, exchanged for short-lived access tokens.
    RefreshToken {
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
    /// Pre-issued access token, used as-is.
    AccessToken(String),
}

impl GoogleCredentials {
    /// Read credentials from the process environment.
    pub fn from_env() -> BridgeResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve credentials through an arbitrary variable lookup.
    ///
    /// The refresh-token triple wins when all three parts are present;
    /// otherwise `GOOGLE_ACCESS_TOKEN` is used. Each part of the triple may
    /// also be given without the `GOOGLE_` prefix.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> BridgeResult<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let either = |key: &str| get(format!("GOOGLE_{key}").as_str()).or_else(|| get(key));

        if let (Some(client_id), Some(client_secret), Some(refresh_token)) = (
            either("CLIENT_ID"),
            either("CLIENT_SECRET"),
            either("REFRESH_TOKEN"),
        ) {
            return Ok(Self::RefreshToken {
                client_id,
                client_secret,
                refresh_token,
            });
        }

        get("GOOGLE_ACCESS_TOKEN")
            .map(Self::AccessToken)
            .ok_or(BridgeError::MissingCredentials)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::RefreshToken { .. } => "refresh_token",
            Self::AccessToken(_) => "access_token",
        }
    }
}

impl std::fmt::Debug for GoogleCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RefreshToken { client_id, .. } => f
                .debug_struct("RefreshToken")
                .field("client_id", client_id)
                .field("client_secret", &"<redacted>")
                .field("refresh_token", &"<redacted>")
                .finish(),
            Self::AccessToken(_) => f.debug_tuple("AccessToken").field(&"<redacted>").finish(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Hands out access tokens, refreshing them when they are about to expire.
pub struct AccessTokenProvider {
    http: reqwest::Client,
    token_url: String,
    credentials: GoogleCredentials,
    cached: Mutex<Option<CachedToken>>,
}

impl AccessTokenProvider {
    pub fn new(http: reqwest::Client, credentials: GoogleCredentials) -> Self {
        Self::with_token_url(http, credentials, GOOGLE_TOKEN_URL)
    }

    pub fn with_token_url(
        http: reqwest::Client,
        credentials: GoogleCredentials,
        token_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            token_url: token_url.into(),
            credentials,
            cached: Mutex::new(None),
        }
    }

    /// Current access token, exchanging the refresh token if needed.
    pub async fn access_token(&self) -> BridgeResult<String> {
        let (client_id, client_secret, refresh_token) = match &self.credentials {
            GoogleCredentials::AccessToken(token) => return Ok(token.clone()),
            GoogleCredentials::RefreshToken {
                client_id,
                client_secret,
                refresh_token,
            } => (client_id, client_secret, refresh_token),
        };

        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        tracing::debug!("Refreshing Google access token");

        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
                ("refresh_token", refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let reason = serde_json::from_str::<TokenErrorResponse>(&body)
                .map(|e| match e.error_description {
                    Some(desc) => format!("{}: {desc}", e.error),
                    None => e.error,
                })
                .unwrap_or_else(|_| format!("token endpoint returned {status}"));
            return Err(BridgeError::Auth(reason));
        }

        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| BridgeError::Decode(e.to_string()))?;

        let lifetime = token
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME);

        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            refresh_at: Instant::now() + lifetime.saturating_sub(EXPIRY_MARGIN),
        });

        Ok(token.access_token)
    }
}
