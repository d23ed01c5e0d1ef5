//! HTTP transport: one endpoint for the push stream and inbound messages.

pub mod http;

pub use http::{router, HttpTransport, ServerState, SESSION_HEADER};
