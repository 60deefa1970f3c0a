//! Operator-facing seams.
//!
//! The listener and controller never touch the terminal directly. Input
//! arrives through a [`Console`] and everything shown to the operator goes
//! through a [`Screen`], so the binary can plug in crossterm while tests
//! plug in scripted doubles.

use std::future::Future;
use std::io;
use std::net::SocketAddr;

use crate::command::Feedback;
use crate::telemetry::TelemetryLine;

/// A single keystroke seen by the controller's polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    /// Ctrl-C delivered as a key (raw terminal mode swallows the signal).
    Interrupt,
}

/// Operator input.
pub trait Console {
    /// Return a pending key without blocking, or `Ok(None)` if there is none.
    fn poll_key(&mut self) -> io::Result<Option<Key>>;

    /// Prompt for and read one full line. `Ok(None)` means end of input.
    ///
    /// This is the controller's only blocking point; the telemetry listener
    /// keeps running while it waits.
    fn read_line(
        &mut self,
        prompt: &str,
    ) -> impl Future<Output = io::Result<Option<String>>> + Send;
}

/// Operator output. Shared by the listener task and the controller.
pub trait Screen: Send + Sync {
    /// One-time notification after lock-on.
    fn device_found(&self, addr: SocketAddr);

    /// Live telemetry, overwriting the previously rendered line in place.
    fn telemetry(&self, line: &TelemetryLine);

    /// Reprint the retained telemetry line once after leaving Input mode.
    fn replay(&self, line: &TelemetryLine);

    /// Outcome of an operator command.
    fn feedback(&self, feedback: &Feedback);

    /// Mode banners and other status text.
    fn notice(&self, text: &str);
}
