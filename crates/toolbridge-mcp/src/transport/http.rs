//! HTTP transport: SSE push channel on GET, JSON-RPC messages on POST.
//!
//! `GET {endpoint}` opens a session and streams its events; the first event
//! is `endpoint`, carrying the URI to POST to. `POST {endpoint}?sessionId=..`
//! (or with the `Mcp-Session-Id` header) delivers one message and answers
//! with its JSON-RPC response. `DELETE` closes the session.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    middleware,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json as AxumJson, Response,
    },
    routing::get,
    Router,
};
use futures::StreamExt;
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use crate::session::{ServerEvent, SessionId, SessionTransport};
use crate::types::{JsonRpcMessage, McpError, McpResult, RequestId};

/// Header carrying the session id, as an alternative to the query parameter.
pub const SESSION_HEADER: &str = "mcp-session-id";

/// Shared server state passed to all handlers via axum State.
pub struct ServerState {
    pub sessions: Arc<SessionTransport>,
    pub token: Option<String>,
}

pub struct HttpTransport {
    state: Arc<ServerState>,
}

impl HttpTransport {
    pub fn new(sessions: Arc<SessionTransport>, token: Option<String>) -> Self {
        Self {
            state: Arc::new(ServerState { sessions, token }),
        }
    }

    pub fn state(&self) -> &Arc<ServerState> {
        &self.state
    }

    /// Serve until Ctrl-C, then close every session so open streams end.
    pub async fn run(&self, addr: &str) -> McpResult<()> {
        let app = router(self.state.clone());

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(McpError::Io)?;

        tracing::info!(
            "MCP endpoint http://{addr}{}",
            self.state.sessions.config().endpoint
        );

        let sessions = self.state.sessions.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("Failed to listen for shutdown signal: {e}");
                    return;
                }
                let closed = sessions.close_all();
                tracing::info!("Shutting down, closed {closed} session(s)");
            })
            .await
            .map_err(|e| McpError::Transport(e.to_string()))?;

        Ok(())
    }
}

/// Build the router. `/health` bypasses the auth layer.
pub fn router(state: Arc<ServerState>) -> Router {
    let endpoint = state.sessions.config().endpoint.clone();

    Router::new()
        .route(
            &endpoint,
            get(open_stream).post(post_message).delete(delete_session),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_layer))
        .route("/health", get(handle_health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
struct SessionQuery {
    #[serde(default, rename = "sessionId")]
    session_id: Option<String>,
}

/// Query parameter first, then header. Blank values count as absent.
fn session_id_from(query: &SessionQuery, headers: &HeaderMap) -> Option<SessionId> {
    let present = |s: &&str| !s.trim().is_empty();

    query
        .session_id
        .as_deref()
        .filter(present)
        .or_else(|| {
            headers
                .get(SESSION_HEADER)
                .and_then(|v| v.to_str().ok())
                .filter(present)
        })
        .map(SessionId::from)
}

fn bad_request() -> Response {
    StatusCode::BAD_REQUEST.into_response()
}

fn json_rpc_failure(status: StatusCode, error: McpError, id: RequestId) -> Response {
    (status, AxumJson(error.to_json_rpc_error(id))).into_response()
}

/// Checks the bearer token if one is configured.
async fn auth_layer(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    request: axum::extract::Request,
    next: middleware::Next,
) -> Response {
    if let Some(expected) = &state.token {
        let authorized = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| token == expected);

        if !authorized {
            return json_rpc_failure(StatusCode::UNAUTHORIZED, McpError::Unauthorized, RequestId::Null);
        }
    }

    next.run(request).await
}

/// GET: open a session and stream its events until the client goes away.
async fn open_stream(State(state): State<Arc<ServerState>>) -> Response {
    let channel = state.sessions.open_session();
    let session_header = channel.id().to_string();

    let events = channel
        .close_on_drop(Arc::downgrade(&state.sessions))
        .map(|event| Ok::<Event, Infallible>(to_sse_event(event)));

    (
        [(SESSION_HEADER, session_header)],
        Sse::new(events).keep_alive(KeepAlive::default()),
    )
        .into_response()
}

fn to_sse_event(event: ServerEvent) -> Event {
    match event {
        ServerEvent::Endpoint { uri } => Event::default().event("endpoint").data(uri),
    }
}

/// POST: route one JSON-RPC message to its session.
async fn post_message(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<SessionQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(session_id) = session_id_from(&query, &headers) else {
        tracing::debug!("POST without session id");
        return bad_request();
    };

    if !state.sessions.is_open(&session_id) {
        tracing::debug!("POST for unknown session {session_id}");
        return bad_request();
    }

    let message = match JsonRpcMessage::decode(&body) {
        Ok(message) => message,
        Err(rejected) => {
            tracing::warn!("Rejected message on session {session_id}: {}", rejected.error);
            return json_rpc_failure(StatusCode::BAD_REQUEST, rejected.error, rejected.id);
        }
    };

    let request_id = message.request_id().cloned().unwrap_or(RequestId::Null);

    match state.sessions.route_inbound(&session_id, message).await {
        Ok(Some(response)) => (StatusCode::OK, AxumJson(response)).into_response(),
        Ok(None) => StatusCode::ACCEPTED.into_response(),
        // Closed between the check above and delivery.
        Err(McpError::SessionNotFound(_)) => bad_request(),
        Err(e) => {
            tracing::error!("Failed to handle message on session {session_id}: {e}");
            json_rpc_failure(StatusCode::INTERNAL_SERVER_ERROR, e, request_id)
        }
    }
}

/// DELETE: explicit teardown. Closing an already-closed session is fine.
async fn delete_session(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<SessionQuery>,
    headers: HeaderMap,
) -> Response {
    let Some(session_id) = session_id_from(&query, &headers) else {
        return bad_request();
    };

    state.sessions.close_session(&session_id);
    StatusCode::NO_CONTENT.into_response()
}

/// Health check endpoint, outside the auth layer.
async fn handle_health(State(state): State<Arc<ServerState>>) -> AxumJson<serde_json::Value> {
    AxumJson(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.sessions.session_count(),
        "tools": state.sessions.registry().len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_query_wins_over_header() {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_static("from-header"));
        let query = SessionQuery {
            session_id: Some("from-query".into()),
        };
        assert_eq!(
            session_id_from(&query, &headers),
            Some(SessionId::from("from-query"))
        );
        assert_eq!(
            session_id_from(&SessionQuery::default(), &headers),
            Some(SessionId::from("from-header"))
        );
    }

    #[test]
    fn test_blank_session_id_is_absent() {
        let query = SessionQuery {
            session_id: Some("  ".into()),
        };
        assert_eq!(session_id_from(&query, &HeaderMap::new()), None);
    }

    #[test]
    fn test_blank_query_falls_through_to_header() {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_static("from-header"));
        let query = SessionQuery {
            session_id: Some(String::new()),
        };
        assert_eq!(
            session_id_from(&query, &headers),
            Some(SessionId::from("from-header"))
        );
    }
}
