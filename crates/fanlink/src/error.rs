//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use fanlink_config::ConfigError;
use fanlink_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const TRANSPORT: i32 = 7;
    pub const NOT_A_TERMINAL: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Transport ────────────────────────────────────────────────────
    #[error("Cannot listen on {addr}")]
    #[diagnostic(
        code(fanlink::bind_failed),
        help(
            "Another process may already own the port, or the address is not local.\n\
             Try a different port: fanlink --port 9000"
        )
    )]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Lost the datagram socket")]
    #[diagnostic(
        code(fanlink::transport),
        help("The session was closed. Check the network interface and restart fanlink.")
    )]
    Transport {
        #[source]
        source: CoreError,
    },

    // ── Terminal ─────────────────────────────────────────────────────
    #[error("fanlink needs an interactive terminal")]
    #[diagnostic(
        code(fanlink::not_a_terminal),
        help("Run fanlink directly in a terminal; stdin and stdout must not be redirected.")
    )]
    NotATerminal,

    #[error("Terminal I/O failed")]
    #[diagnostic(code(fanlink::terminal))]
    Terminal(#[source] std::io::Error),

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(fanlink::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file already exists at {path}")]
    #[diagnostic(
        code(fanlink::config_exists),
        help("Use --force (-f) to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error("Configuration could not be loaded")]
    #[diagnostic(
        code(fanlink::config),
        help("Check the file with: fanlink config show")
    )]
    Config(#[source] ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render configuration: {0}")]
    #[diagnostic(code(fanlink::toml))]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Bind { .. } | Self::Transport { .. } => exit_code::TRANSPORT,
            Self::NotATerminal => exit_code::NOT_A_TERMINAL,
            Self::Validation { .. } | Self::ConfigExists { .. } => exit_code::USAGE,
            Self::Config(_) => exit_code::CONFIG,
            Self::Terminal(_) | Self::Io(_) | Self::Toml(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Bind { addr, source } => CliError::Bind {
                addr: addr.to_string(),
                source,
            },
            CoreError::Console(source) => CliError::Terminal(source),
            err @ (CoreError::Receive(_) | CoreError::ListenerStopped(_)) => {
                CliError::Transport { source: err }
            }
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(source) => CliError::Io(source),
            other => CliError::Config(other),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_category() {
        let bind = CliError::from(CoreError::Bind {
            addr: "0.0.0.0:8080".parse().unwrap(),
            source: std::io::Error::from(std::io::ErrorKind::AddrInUse),
        });
        assert_eq!(bind.exit_code(), exit_code::TRANSPORT);

        let receive = CliError::from(CoreError::Receive(std::io::Error::from(
            std::io::ErrorKind::ConnectionReset,
        )));
        assert_eq!(receive.exit_code(), exit_code::TRANSPORT);

        let invalid = CliError::from(ConfigError::Validation {
            field: "console.input_key".into(),
            reason: "must be exactly one character".into(),
        });
        assert_eq!(invalid.exit_code(), exit_code::USAGE);

        assert_eq!(CliError::NotATerminal.exit_code(), exit_code::NOT_A_TERMINAL);
    }
}
