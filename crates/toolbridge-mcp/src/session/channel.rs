//! The push half of a session: events flowing from server to client.

use std::pin::Pin;
use std::sync::Weak;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::{SessionId, SessionTransport};

/// Event written on a session's push channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// Handshake frame: where to POST messages for this session.
    Endpoint { uri: String },
}

/// Receiving end of a session's push channel, handed to whoever owns the
/// client connection.
pub struct SessionChannel {
    id: SessionId,
    events: mpsc::Receiver<ServerEvent>,
}

impl SessionChannel {
    pub(crate) fn new(id: SessionId, events: mpsc::Receiver<ServerEvent>) -> Self {
        Self { id, events }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Next event; `None` once the session is closed.
    pub async fn recv(&mut self) -> Option<ServerEvent> {
        self.events.recv().await
    }

    /// Turn the channel into a stream that closes the session when dropped,
    /// i.e. when the client disconnects.
    pub fn close_on_drop(self, transport: Weak<SessionTransport>) -> SessionStream {
        SessionStream {
            events: ReceiverStream::new(self.events),
            guard: CloseGuard {
                transport,
                id: self.id,
            },
        }
    }
}

/// Event stream bound to a session's lifetime.
pub struct SessionStream {
    events: ReceiverStream<ServerEvent>,
    guard: CloseGuard,
}

impl SessionStream {
    pub fn id(&self) -> &SessionId {
        &self.guard.id
    }
}

impl Stream for SessionStream {
    type Item = ServerEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.events).poll_next(cx)
    }
}

struct CloseGuard {
    transport: Weak<SessionTransport>,
    id: SessionId,
}

impl Drop for CloseGuard {
    fn drop(&mut self) {
        if let Some(transport) = self.transport.upgrade() {
            if transport.close_session(&self.id) {
                tracing::info!("Session {} closed on disconnect", self.id);
            }
        }
    }
}
