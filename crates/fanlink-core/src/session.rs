// ── Device session state ──
//
// The only state shared between the telemetry listener and the operator
// controller. Each field uses a primitive that makes torn reads
// impossible: a write-once cell for the device address, a `watch`
// channel for the mode, and an `ArcSwapOption` for the last telemetry
// line. No two of them are ever held at the same time.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwapOption;
use strum::{Display, EnumString};
use tokio::sync::watch;
use tracing::debug;

use crate::telemetry::TelemetryLine;

/// Whether inbound telemetry is rendered live or held back while the
/// operator types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    #[default]
    Monitor,
    Input,
}

/// Shared session state for one device.
///
/// Cheap to share behind an `Arc`; every accessor takes `&self`.
pub struct Session {
    address: OnceLock<SocketAddr>,
    mode: watch::Sender<Mode>,
    last_message: ArcSwapOption<TelemetryLine>,
}

impl Session {
    pub fn new() -> Self {
        let (mode, _) = watch::channel(Mode::Monitor);
        Self {
            address: OnceLock::new(),
            mode,
            last_message: ArcSwapOption::empty(),
        }
    }

    // ── Device address ───────────────────────────────────────────────

    /// Record `addr` as the device address if none is known yet.
    ///
    /// Returns `true` only for the call that performed the lock-on. Later
    /// senders never replace the first one.
    pub fn try_lock_on(&self, addr: SocketAddr) -> bool {
        let locked = self.address.set(addr).is_ok();
        if locked {
            debug!(%addr, "locked on to device");
        }
        locked
    }

    pub fn address(&self) -> Option<SocketAddr> {
        self.address.get().copied()
    }

    // ── Mode ─────────────────────────────────────────────────────────

    pub fn set_mode(&self, mode: Mode) {
        let previous = self.mode.send_replace(mode);
        if previous != mode {
            debug!(from = %previous, to = %mode, "mode changed");
        }
    }

    pub fn mode(&self) -> Mode {
        *self.mode.borrow()
    }

    /// Observe mode transitions.
    pub fn subscribe_mode(&self) -> watch::Receiver<Mode> {
        self.mode.subscribe()
    }

    // ── Last telemetry line ──────────────────────────────────────────

    /// Overwrite the retained telemetry line and hand back the stored
    /// copy. Once set it is never cleared.
    pub fn set_last_message(&self, line: TelemetryLine) -> Arc<TelemetryLine> {
        let line = Arc::new(line);
        self.last_message.store(Some(Arc::clone(&line)));
        line
    }

    pub fn last_message(&self) -> Option<Arc<TelemetryLine>> {
        self.last_message.load_full()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("address", &self.address())
            .field("mode", &self.mode())
            .field("last_message", &self.last_message().map(|l| l.text.clone()))
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn addr(s: &str) -> SocketAddr {
        s.parse().unwrap()
    }

    #[test]
    fn starts_unlocked_in_monitor_mode() {
        let session = Session::new();
        assert_eq!(session.address(), None);
        assert_eq!(session.mode(), Mode::Monitor);
        assert!(session.last_message().is_none());
    }

    #[test]
    fn first_sender_wins_lock_on() {
        let session = Session::new();
        assert!(session.try_lock_on(addr("10.0.0.5:51000")));
        assert!(!session.try_lock_on(addr("10.0.0.9:4000")));
        assert!(!session.try_lock_on(addr("10.0.0.5:51000")));
        assert_eq!(session.address(), Some(addr("10.0.0.5:51000")));
    }

    #[test]
    fn concurrent_lock_on_has_exactly_one_winner() {
        let session = Arc::new(Session::new());
        let handles: Vec<_> = (0..8u16)
            .map(|i| {
                let session = Arc::clone(&session);
                std::thread::spawn(move || {
                    session.try_lock_on(SocketAddr::from(([10, 0, 0, 1], 5000 + i)))
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert!(session.address().is_some());
    }

    #[test]
    fn mode_round_trips_and_notifies() {
        let session = Session::new();
        let mut rx = session.subscribe_mode();

        session.set_mode(Mode::Input);
        assert_eq!(session.mode(), Mode::Input);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Mode::Input);

        session.set_mode(Mode::Monitor);
        assert_eq!(session.mode(), Mode::Monitor);
    }

    #[test]
    fn last_message_is_overwritten_not_cleared() {
        let session = Session::new();
        session.set_last_message(TelemetryLine::new("first"));
        session.set_last_message(TelemetryLine::new("second"));
        assert_eq!(session.last_message().unwrap().text, "second");
    }

    #[test]
    fn mode_names() {
        assert_eq!(Mode::Monitor.to_string(), "monitor");
        assert_eq!("input".parse::<Mode>().unwrap(), Mode::Input);
    }
}
