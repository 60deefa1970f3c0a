//! Console renderer for session output.
//!
//! Live telemetry overwrites a single line in place. Everything else is
//! printed on its own line, first breaking off any live line so it is not
//! clobbered. Raw mode is on, so every line ends in `\r\n`.

use std::io::{self, IsTerminal, Write};
use std::net::SocketAddr;
use std::sync::Mutex;

use crossterm::{QueueableCommand, terminal};
use owo_colors::OwoColorize;

use fanlink_core::{FanMode, Feedback, Screen, TelemetryLine};

use crate::cli::ColorMode;

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

pub struct ConsoleScreen {
    color: bool,
    /// True while the cursor sits at the end of a live telemetry line.
    live: Mutex<bool>,
}

impl ConsoleScreen {
    pub fn new(color: bool) -> Self {
        Self {
            color,
            live: Mutex::new(false),
        }
    }

    fn telemetry_text(&self, line: &TelemetryLine) -> String {
        let stamp = format!("[{}]", line.timestamp());
        if !self.color {
            return format!("{stamp} {}", line.text);
        }
        let text = match line.status().and_then(|status| status.mode) {
            Some(FanMode::Auto) => line.text.cyan().to_string(),
            Some(FanMode::Manual) => line.text.yellow().to_string(),
            None => line.text.clone(),
        };
        format!("{} {text}", stamp.dimmed())
    }

    /// Overwrite the current line with `text`, leaving the cursor after it.
    fn write_live(&self, text: &str) {
        let mut live = self.live.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut out = io::stdout().lock();
        let _ = out.write_all(b"\r");
        let _ = out.queue(terminal::Clear(terminal::ClearType::CurrentLine));
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
        *live = true;
    }

    /// Print `text` (possibly multi-line) on fresh lines.
    fn write_lines(&self, text: &str) {
        let mut live = self.live.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut out = io::stdout().lock();
        if *live {
            let _ = out.write_all(b"\r\n");
            *live = false;
        }
        for line in text.lines() {
            let _ = out.write_all(line.as_bytes());
            let _ = out.write_all(b"\r\n");
        }
        let _ = out.flush();
    }

    fn paint(&self, text: &str, style: fn(&str) -> String) -> String {
        if self.color {
            style(text)
        } else {
            text.to_owned()
        }
    }
}

impl Screen for ConsoleScreen {
    fn device_found(&self, addr: SocketAddr) {
        let text = format!("device found at {addr}");
        self.write_lines(&self.paint(&text, |t| t.green().bold().to_string()));
    }

    fn telemetry(&self, line: &TelemetryLine) {
        self.write_live(&self.telemetry_text(line));
    }

    fn replay(&self, line: &TelemetryLine) {
        self.write_live(&self.telemetry_text(line));
    }

    fn feedback(&self, feedback: &Feedback) {
        let text = if feedback.is_error() {
            self.paint(&format!("error: {}", feedback.text), |t| t.red().to_string())
        } else {
            feedback.text.clone()
        };
        self.write_lines(&text);
    }

    fn notice(&self, text: &str) {
        self.write_lines(&self.paint(&format!("-- {text} --"), |t| t.dimmed().to_string()));
    }
}
