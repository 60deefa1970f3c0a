//! crossterm-backed operator console.
//!
//! The terminal stays in raw mode for the whole session so single
//! keystrokes reach the controller without Enter. Line input is edited and
//! echoed here while raw mode is still on.

use std::io::{self, IsTerminal, Stdout, Write};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{QueueableCommand, cursor, terminal};

use fanlink_core::{Console, Key};

use crate::error::CliError;

/// Leave raw mode and show the cursor. Safe to call more than once.
pub fn restore() {
    let _ = terminal::disable_raw_mode();
    let mut out = io::stdout();
    let _ = out.queue(cursor::Show);
    let _ = out.flush();
}

/// Restore the terminal before the default panic report is printed.
pub fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore();
        default_hook(info);
    }));
}

pub struct Terminal {
    out: Stdout,
    poll_interval: Duration,
}

impl Terminal {
    /// Enter raw mode. Fails when stdin or stdout is not a terminal.
    pub fn enter(poll_interval: Duration) -> Result<Self, CliError> {
        if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
            return Err(CliError::NotATerminal);
        }
        terminal::enable_raw_mode().map_err(CliError::Terminal)?;
        tracing::debug!("terminal in raw mode");

        Ok(Self {
            out: io::stdout(),
            poll_interval,
        })
    }

    /// Next pending key event, if any, without blocking.
    fn next_key(&self) -> io::Result<Option<KeyEvent>> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Release {
                    return Ok(Some(key));
                }
            }
        }
        Ok(None)
    }

    fn echo(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore();
    }
}

fn is_ctrl(key: &KeyEvent, c: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(c)
}

impl Console for Terminal {
    fn poll_key(&mut self) -> io::Result<Option<Key>> {
        let Some(key) = self.next_key()? else {
            return Ok(None);
        };
        if is_ctrl(&key, 'c') {
            return Ok(Some(Key::Interrupt));
        }
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                Ok(Some(Key::Char(c)))
            }
            _ => Ok(None),
        }
    }

    async fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.echo(&format!("\r{prompt}"))?;
        let mut line = String::new();

        loop {
            while let Some(key) = self.next_key()? {
                if is_ctrl(&key, 'c') || (is_ctrl(&key, 'd') && line.is_empty()) {
                    self.echo("\r\n")?;
                    return Ok(None);
                }
                match key.code {
                    KeyCode::Enter => {
                        self.echo("\r\n")?;
                        return Ok(Some(line));
                    }
                    // Abandon the line; an empty command sends nothing.
                    KeyCode::Esc => {
                        self.echo("\r\n")?;
                        return Ok(Some(String::new()));
                    }
                    KeyCode::Backspace => {
                        if line.pop().is_some() {
                            self.echo("\u{8} \u{8}")?;
                        }
                    }
                    KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                        line.push(c);
                        let mut buf = [0u8; 4];
                        self.echo(c.encode_utf8(&mut buf))?;
                    }
                    _ => {}
                }
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
