//! Clap derive structures for the `fanlink` CLI.
//!
//! Defines the command tree, global flags, and session overrides.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fanlink -- live console for a networked fan controller
#[derive(Debug, Parser)]
#[command(
    name = "fanlink",
    version,
    about = "Monitor and steer a networked fan controller over UDP",
    long_about = "Listens for telemetry datagrams from a fan controller, locks on to the \
        first device that reports, and shows its status live.\n\n\
        Press the input key (default 'r') to type a command: a speed percentage \
        (0-100), PWM:<0-255>, AUTO or MANUAL. Quick keys 0-5, A and M act \
        immediately. Ctrl-C quits.",
    propagate_version = true,
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(flatten)]
    pub session: SessionOpts,

    #[command(subcommand)]
    pub command: Option<Command>,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Log file (defaults to fanlink.log in the platform data directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

// ── Session Options ──────────────────────────────────────────────────

/// Overrides for the live session. Unset flags fall back to the config file.
#[derive(Debug, Default, Args)]
pub struct SessionOpts {
    /// Local IP address to listen on
    #[arg(long)]
    pub host: Option<String>,

    /// UDP port to listen on
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Key that opens the command prompt
    #[arg(long, value_name = "KEY")]
    pub input_key: Option<String>,

    /// Interval between key checks (e.g. 100ms)
    #[arg(long, value_parser = humantime::parse_duration, value_name = "DURATION")]
    pub poll_interval: Option<Duration>,
}

// ── Color ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Subcommands ──────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect and initialise the configuration file
    #[command(alias = "cfg")]
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display the resolved configuration (file + environment)
    Show,

    /// Write a config file with default settings
    Init {
        /// Overwrite an existing file without asking
        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
