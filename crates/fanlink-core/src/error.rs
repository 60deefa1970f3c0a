// ── Core error types ──
//
// Only transport and console failures surface as errors. Operator input
// problems and pre-discovery sends are reported as feedback text and
// never leave the session loop.

use std::net::SocketAddr;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Transport errors (fatal) ─────────────────────────────────────
    #[error("Cannot bind datagram socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Datagram receive failed: {0}")]
    Receive(#[source] std::io::Error),

    #[error("Telemetry listener stopped unexpectedly: {0}")]
    ListenerStopped(String),

    // ── Console errors ───────────────────────────────────────────────
    #[error("Console I/O failed: {0}")]
    Console(#[source] std::io::Error),
}
