// ── Runtime session configuration ──
//
// Describes *how* a session binds and behaves. Core never reads config
// files: the CLI builds a `BridgeConfig` (from fanlink-config plus flag
// overrides) and hands it in.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::link::DEFAULT_PORT;

/// Default interval between non-blocking key checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default key that switches the console into Input mode.
pub const DEFAULT_INPUT_KEY: char = 'r';

/// Configuration for one device session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Local address to bind for telemetry and command traffic.
    pub bind: SocketAddr,
    /// Sleep between key polls. Keeps the loop responsive to shutdown.
    pub poll_interval: Duration,
    /// Key that enters Input mode (matched case-insensitively).
    pub input_key: char,
    /// Appended to every protocol string before sending.
    pub line_terminator: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            poll_interval: DEFAULT_POLL_INTERVAL,
            input_key: DEFAULT_INPUT_KEY,
            line_terminator: "\n".into(),
        }
    }
}
