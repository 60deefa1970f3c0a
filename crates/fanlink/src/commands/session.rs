//! The live session: telemetry on screen, commands from the keyboard.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use fanlink_core::{Bridge, BridgeConfig, Screen};

use crate::cli::ColorMode;
use crate::error::CliError;
use crate::screen::{ConsoleScreen, should_color};
use crate::terminal::Terminal;

/// Run one device session until the operator quits or the link fails.
pub async fn run(
    bridge_config: BridgeConfig,
    color: ColorMode,
    shutdown: CancellationToken,
) -> Result<(), CliError> {
    let poll_interval = bridge_config.poll_interval;
    let input_key = bridge_config.input_key;

    // Bind before touching the terminal so a busy port fails cleanly.
    let bridge = Bridge::bind(bridge_config).await?;
    let terminal = Terminal::enter(poll_interval)?;
    let screen = Arc::new(ConsoleScreen::new(should_color(color)));

    screen_banner(&screen, &bridge, input_key);
    info!(local_addr = %bridge.local_addr(), "session started");

    let result = bridge.run(terminal, screen, shutdown).await;
    info!(ok = result.is_ok(), "session ended");
    Ok(result?)
}

fn screen_banner(screen: &ConsoleScreen, bridge: &Bridge, input_key: char) {
    screen.notice(&format!(
        "listening on {}, waiting for the device to report",
        bridge.local_addr()
    ));
    screen.notice(&format!(
        "press '{input_key}' to type a command, 0-5/A/M for quick settings, Ctrl-C to quit"
    ));
}
