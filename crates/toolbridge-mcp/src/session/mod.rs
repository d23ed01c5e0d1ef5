//! Session transport: session ids, per-session channels, and routing.

pub mod channel;
pub mod id;
pub mod transport;

pub use channel::{ServerEvent, SessionChannel, SessionStream};
pub use id::SessionId;
pub use transport::{SessionTransport, TransportConfig};
