//! `fanlink`: interactive console for a networked fan controller.
//!
//! Logs go to a file because stdout carries the live telemetry line and
//! the command prompt.

mod cli;
mod commands;
mod config;
mod error;
mod screen;
mod terminal;

use std::path::Path;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    terminal::install_panic_hook();

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        terminal::restore();
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Set up file-based tracing. Returns a guard that must be held for the
/// lifetime of the session so buffered lines are flushed.
fn setup_tracing(log_file: &Path, verbosity: u8) -> Result<WorkerGuard, CliError> {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("fanlink={log_level},fanlink_core={log_level}"))
    });

    let log_dir = log_file.parent().unwrap_or(Path::new("."));
    let log_filename = log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("fanlink.log"));
    std::fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    Ok(guard)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    // Utility subcommands never open the socket or the log file
    if let Some(cmd) = cli.command {
        return commands::dispatch(cmd, &cli.global);
    }

    let cfg = config::load(&cli.global, &cli.session)?;
    let bridge_config = config::bridge_config(&cfg)?;
    let color = config::color_mode(&cfg)?;
    let _guard = setup_tracing(&cfg.log_path(), cli.global.verbose)?;
    tracing::debug!(?bridge_config, "configuration resolved");

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt signal received");
            signal_token.cancel();
        }
    });

    commands::session::run(bridge_config, color, shutdown).await
}
