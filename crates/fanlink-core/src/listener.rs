// ── Telemetry listener ──
//
// Background receive loop. Locks on to the first sender, retains the
// newest telemetry line regardless of mode, and renders (including the
// one-time device announcement) only while the session is in Monitor mode.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace};

use crate::console::Screen;
use crate::error::CoreError;
use crate::link::{DatagramSource, Link, MAX_DATAGRAM_SIZE};
use crate::session::{Mode, Session};
use crate::telemetry::{TelemetryLine, decode_payload};

/// What happened to a single datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Blank after decoding and trimming; nothing retained.
    Empty,
    /// Retained and rendered live.
    Rendered,
    /// Retained but not rendered (Input mode).
    Suppressed,
}

pub struct TelemetryListener<S = Link> {
    session: Arc<Session>,
    source: S,
    screen: Arc<dyn Screen>,
    /// Lock-on happened in Input mode; announce once Monitor resumes.
    announce_pending: AtomicBool,
}

impl<S: DatagramSource> TelemetryListener<S> {
    pub fn new(session: Arc<Session>, source: S, screen: Arc<dyn Screen>) -> Self {
        Self {
            session,
            source,
            screen,
            announce_pending: AtomicBool::new(false),
        }
    }

    /// Receive until `shutdown` fires. A receive failure is fatal and
    /// returned; shutdown is a normal exit.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), CoreError> {
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];

        loop {
            let received = tokio::select! {
                () = shutdown.cancelled() => {
                    debug!("telemetry listener stopped");
                    return Ok(());
                }
                received = self.source.recv(&mut buf) => received,
            };

            match received {
                Ok((len, from)) => {
                    self.handle_datagram(&buf[..len], from);
                }
                Err(err) => {
                    error!(error = %err, "datagram receive failed");
                    return Err(CoreError::Receive(err));
                }
            }
        }
    }

    /// Process one inbound datagram.
    pub fn handle_datagram(&self, payload: &[u8], from: SocketAddr) -> Disposition {
        let text = decode_payload(payload);

        if self.session.address().is_none() && self.session.try_lock_on(from) {
            self.announce_pending.store(true, Ordering::Release);
        }

        // Never print over a half-typed command.
        let mode = self.session.mode();
        if mode == Mode::Monitor && self.announce_pending.swap(false, Ordering::AcqRel) {
            if let Some(device) = self.session.address() {
                self.screen.device_found(device);
            }
        }

        let text = text.trim();
        if text.is_empty() {
            trace!(%from, "empty datagram");
            return Disposition::Empty;
        }

        let line = self.session.set_last_message(TelemetryLine::new(text));
        if let Some(status) = line.status() {
            trace!(
                temperature_c = ?status.temperature_c,
                humidity_pct = ?status.humidity_pct,
                mode = ?status.mode,
                speed_pct = ?status.speed_pct,
                "status report"
            );
        }

        match mode {
            Mode::Input => Disposition::Suppressed,
            Mode::Monitor => {
                self.screen.telemetry(&line);
                Disposition::Rendered
            }
        }
    }
}
