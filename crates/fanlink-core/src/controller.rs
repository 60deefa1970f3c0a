// ── Interactive controller ──
//
// Foreground polling loop. Checks for a key every `poll_interval`, enters
// Input mode on the configured key, resolves quick keys in Monitor mode,
// and sends parsed commands to the locked-on device address.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::command::{self, DeviceCommand, Feedback, ParsedInput};
use crate::config::BridgeConfig;
use crate::console::{Console, Key, Screen};
use crate::error::CoreError;
use crate::link::Link;
use crate::session::{Mode, Session};

const PROMPT: &str = "command > ";

/// Whether the polling loop keeps going after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Holds the session in Input mode and returns it to Monitor on drop,
/// whichever way the line read ends.
struct InputMode {
    session: Arc<Session>,
}

impl InputMode {
    fn enter(session: &Arc<Session>) -> Self {
        session.set_mode(Mode::Input);
        Self {
            session: Arc::clone(session),
        }
    }
}

impl Drop for InputMode {
    fn drop(&mut self) {
        self.session.set_mode(Mode::Monitor);
    }
}

pub struct Controller<C> {
    session: Arc<Session>,
    link: Link,
    console: C,
    screen: Arc<dyn Screen>,
    config: BridgeConfig,
}

impl<C: Console> Controller<C> {
    pub fn new(
        session: Arc<Session>,
        link: Link,
        console: C,
        screen: Arc<dyn Screen>,
        config: BridgeConfig,
    ) -> Self {
        Self {
            session,
            link,
            console,
            screen,
            config,
        }
    }

    /// Poll for keys until shutdown, an interrupt key, or end of input.
    pub async fn run(&mut self, shutdown: &CancellationToken) -> Result<(), CoreError> {
        while !shutdown.is_cancelled() {
            match self.console.poll_key().map_err(CoreError::Console)? {
                Some(Key::Interrupt) => {
                    info!("interrupted from console");
                    return Ok(());
                }
                Some(Key::Char(key)) => {
                    if self.handle_key(key, shutdown).await? == Flow::Stop {
                        return Ok(());
                    }
                }
                None => {}
            }

            tokio::select! {
                () = shutdown.cancelled() => {}
                () = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }

        debug!("controller stopped");
        Ok(())
    }

    async fn handle_key(
        &mut self,
        key: char,
        shutdown: &CancellationToken,
    ) -> Result<Flow, CoreError> {
        if key.eq_ignore_ascii_case(&self.config.input_key) {
            return self.input_mode(shutdown).await;
        }

        match command::quick_key(key) {
            Some(text) => self.quick_key(key, text).await,
            None => trace!(?key, "ignored key"),
        }
        Ok(Flow::Continue)
    }

    /// Quick keys act only in Monitor mode and only once a device is known.
    async fn quick_key(&self, key: char, text: &str) {
        if self.session.mode() != Mode::Monitor {
            return;
        }
        let Some(device) = self.session.address() else {
            debug!(?key, "quick key before device discovery ignored");
            return;
        };

        debug!(?key, text, "quick key");
        self.dispatch(command::parse(text), device).await;
    }

    async fn input_mode(&mut self, shutdown: &CancellationToken) -> Result<Flow, CoreError> {
        {
            let _input = InputMode::enter(&self.session);
            self.screen
                .notice("input mode: 0-100, PWM:<0-255>, A/M, ? for help (telemetry paused)");

            let line = tokio::select! {
                () = shutdown.cancelled() => return Ok(Flow::Stop),
                line = self.console.read_line(PROMPT) => line.map_err(CoreError::Console)?,
            };
            let Some(line) = line else {
                debug!("end of input");
                return Ok(Flow::Stop);
            };

            match self.session.address() {
                None => self
                    .screen
                    .feedback(&Feedback::error("no device discovered yet, input discarded")),
                Some(device) => self.dispatch(command::parse(&line), device).await,
            }
        }

        self.screen.notice("monitor mode");
        if let Some(last) = self.session.last_message() {
            self.screen.replay(&last);
        }
        Ok(Flow::Continue)
    }

    /// Send the parsed command (if any), then show its feedback.
    async fn dispatch(&self, parsed: ParsedInput, device: SocketAddr) {
        if let Some(command) = &parsed.command {
            if let Err(err) = self.transmit(command, device).await {
                warn!(%device, %command, error = %err, "send failed");
                self.screen
                    .feedback(&Feedback::error(format!("send to {device} failed: {err}")));
                return;
            }
        }

        if !parsed.feedback.is_empty() {
            self.screen.feedback(&parsed.feedback);
        }
    }

    async fn transmit(&self, command: &DeviceCommand, device: SocketAddr) -> std::io::Result<()> {
        let payload = format!("{}{}", command.as_protocol(), self.config.line_terminator);
        self.link.send_to(payload.as_bytes(), device).await?;
        debug!(%device, %command, "command sent");
        Ok(())
    }
}
