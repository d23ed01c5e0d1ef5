//! Session registry and inbound routing.
//!
//! Each open session owns a worker task that processes that session's
//! messages strictly in arrival order, plus a push channel that carries the
//! handshake and stays open for as long as the session does. The `SessionId -> handle` map is the only
//! shared mutable state; removal from it is the single point of teardown.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::AbortHandle;

use crate::protocol::handler::{ProtocolHandler, DEFAULT_CALL_TIMEOUT};
use crate::tools::ToolRegistry;
use crate::types::{JsonRpcMessage, McpError, McpResult};

use super::{ServerEvent, SessionChannel, SessionId};

#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Path clients POST to; announced in the handshake frame.
    pub endpoint: String,
    /// Bound on queued inbound messages and pending push events per session.
    pub queue_depth: usize,
    pub call_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            endpoint: "/mcp".to_string(),
            queue_depth: 32,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

struct Inbound {
    message: JsonRpcMessage,
    reply: oneshot::Sender<Option<Value>>,
}

struct SessionHandle {
    inbound: mpsc::Sender<Inbound>,
    // Dropped on close, which ends the client's event stream.
    _outbound: mpsc::Sender<ServerEvent>,
    worker: AbortHandle,
}

/// Owns every open session of one server instance.
pub struct SessionTransport {
    registry: Arc<ToolRegistry>,
    config: TransportConfig,
    sessions: DashMap<SessionId, SessionHandle>,
}

impl SessionTransport {
    pub fn new(registry: Arc<ToolRegistry>, config: TransportConfig) -> Self {
        Self {
            registry,
            config,
            sessions: DashMap::new(),
        }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Open a session: mint an id, start its worker, and queue the
    /// handshake frame. Must be called from within a tokio runtime.
    pub fn open_session(&self) -> SessionChannel {
        let id = SessionId::generate();
        let depth = self.config.queue_depth.max(1);

        let (inbound_tx, inbound_rx) = mpsc::channel(depth);
        let (outbound_tx, outbound_rx) = mpsc::channel(depth);

        let handler = ProtocolHandler::with_timeout(self.registry.clone(), self.config.call_timeout);
        let worker = tokio::spawn(run_session(id.clone(), handler, inbound_rx)).abort_handle();

        // Fresh channel with capacity >= 1, so this cannot fail.
        let _ = outbound_tx.try_send(ServerEvent::Endpoint {
            uri: format!("{}?sessionId={id}", self.config.endpoint),
        });

        self.sessions.insert(
            id.clone(),
            SessionHandle {
                inbound: inbound_tx,
                _outbound: outbound_tx,
                worker,
            },
        );

        tracing::info!("Session {id} opened ({} open)", self.sessions.len());
        SessionChannel::new(id, outbound_rx)
    }

    /// Deliver a message to its session and wait for the reply.
    ///
    /// Returns `None` for messages that get no reply (notifications).
    pub async fn route_inbound(
        &self,
        id: &SessionId,
        message: JsonRpcMessage,
    ) -> McpResult<Option<Value>> {
        let inbound = self
            .sessions
            .get(id)
            .map(|handle| handle.inbound.clone())
            .ok_or_else(|| McpError::SessionNotFound(id.to_string()))?;

        let (reply, response) = oneshot::channel();
        inbound
            .send(Inbound { message, reply })
            .await
            .map_err(|_| McpError::SessionNotFound(id.to_string()))?;

        // The worker drops the reply sender only when it is aborted.
        response.await.map_err(|_| McpError::RequestCancelled)
    }

    /// Close a session and cancel its in-flight work.
    ///
    /// Idempotent. Returns `true` only for the call that actually removed
    /// the session, so teardown happens once however many triggers race.
    pub fn close_session(&self, id: &SessionId) -> bool {
        match self.sessions.remove(id) {
            Some((_, handle)) => {
                handle.worker.abort();
                tracing::info!("Session {id} closed ({} open)", self.sessions.len());
                true
            }
            None => false,
        }
    }

    /// Close every open session. Used on shutdown.
    pub fn close_all(&self) -> usize {
        let ids: Vec<SessionId> = self.sessions.iter().map(|e| e.key().clone()).collect();
        ids.iter().filter(|id| self.close_session(id)).count()
    }

    pub fn is_open(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

async fn run_session(id: SessionId, handler: ProtocolHandler, mut inbound: mpsc::Receiver<Inbound>) {
    while let Some(Inbound { message, reply }) = inbound.recv().await {
        if let Some(method) = message.method() {
            tracing::debug!("Session {id}: {method}");
        }

        let response = handler.handle_message(message).await;
        if reply.send(response).is_err() {
            tracing::debug!("Session {id}: client stopped waiting for a response");
        }
    }
}
