//! Initialize handshake.
//!
//! The server offers the same capabilities to every client, so nothing from
//! the handshake is kept; it is only logged.

use crate::types::{InitializeParams, InitializeResult, MCP_VERSION};

/// Answer an `initialize` request.
pub fn negotiate(params: &InitializeParams) -> InitializeResult {
    if params.protocol_version != MCP_VERSION {
        tracing::warn!(
            "Client requested protocol version {}, server supports {}. Proceeding with server version.",
            params.protocol_version,
            MCP_VERSION
        );
    }

    tracing::info!(
        "Initialized with client: {} v{}",
        params.client_info.name,
        params.client_info.version
    );

    InitializeResult::default_result()
}
