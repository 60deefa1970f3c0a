//! Duplex session engine between an operator console and one networked
//! fan controller.
//!
//! - **[`Bridge`]**: Binds the datagram [`Link`], spawns the
//!   [`TelemetryListener`] in the background, and runs the interactive
//!   [`Controller`] in the foreground until shutdown.
//!
//! - **[`Session`]**: State shared by both sides: the device address
//!   (locked on from the first datagram, then fixed), the current [`Mode`],
//!   and the newest [`TelemetryLine`].
//!
//! - **[`command`]**: Pure grammar from operator text (`60`, `PWM:200`,
//!   `auto`, ...) to protocol strings (`SPEED:153`, `AUTO`, ...), plus the
//!   quick-key table.
//!
//! - **[`Console`] / [`Screen`]**: Input and output seams implemented by
//!   the terminal front end and by test doubles.

pub mod bridge;
pub mod command;
pub mod config;
pub mod console;
pub mod controller;
pub mod error;
pub mod link;
pub mod listener;
pub mod session;
pub mod telemetry;

// ── Primary re-exports ──────────────────────────────────────────────
pub use bridge::Bridge;
pub use command::{DeviceCommand, Feedback, FeedbackLevel, ParsedInput, parse};
pub use config::BridgeConfig;
pub use console::{Console, Key, Screen};
pub use controller::Controller;
pub use error::CoreError;
pub use link::{DatagramSource, Link};
pub use listener::{Disposition, TelemetryListener};
pub use session::{Mode, Session};
pub use telemetry::{FanMode, FanStatus, TelemetryLine};
