//! Configuration file for fanlink.
//!
//! TOML model, layered loading (defaults → file → `FANLINK_` environment),
//! saving, and translation to `fanlink_core::BridgeConfig`. The CLI applies
//! its flag overrides on top of the loaded [`Config`].

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use fanlink_core::command::quick_key;
use fanlink_core::link::DEFAULT_PORT;
use fanlink_core::{BridgeConfig, config::DEFAULT_INPUT_KEY};

/// Prefix for environment overrides. `__` separates nested keys.
pub const ENV_PREFIX: &str = "FANLINK_";

const COLOR_CHOICES: &[&str] = &["auto", "always", "never"];

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub listen: Listen,

    #[serde(default)]
    pub console: ConsoleSettings,

    #[serde(default)]
    pub device: Device,

    #[serde(default)]
    pub log: Log,
}

/// Where the datagram socket binds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Listen {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for Listen {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConsoleSettings {
    /// Single key that opens the command prompt.
    #[serde(default = "default_input_key")]
    pub input_key: String,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// "auto", "always" or "never".
    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            input_key: default_input_key(),
            poll_interval_ms: default_poll_interval_ms(),
            color: default_color(),
        }
    }
}

fn default_input_key() -> String {
    DEFAULT_INPUT_KEY.to_string()
}
fn default_poll_interval_ms() -> u64 {
    100
}
fn default_color() -> String {
    "auto".into()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Device {
    /// Appended to every command sent to the device.
    #[serde(default = "default_line_terminator")]
    pub line_terminator: String,
}

impl Default for Device {
    fn default() -> Self {
        Self {
            line_terminator: default_line_terminator(),
        }
    }
}

fn default_line_terminator() -> String {
    "\n".into()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Log {
    /// Log file. Defaults to `fanlink.log` in the data-local directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "fanlink", "fanlink")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default log file location.
pub fn default_log_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(".local/share").join("fanlink.log"),
        |dirs| dirs.data_local_dir().join("fanlink.log"),
    )
}

fn home_fallback(sub: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(sub);
    p.push("fanlink");
    p
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load the config from `path` (or the default location) plus environment.
///
/// A missing file is not an error; defaults and environment still apply.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);

    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()?;
    Ok(config)
}

// ── Saving ──────────────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`, creating parents.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Validate and build the runtime session config.
    pub fn to_bridge_config(&self) -> Result<BridgeConfig, ConfigError> {
        self.validate_color()?;

        let host: IpAddr = self.listen.host.trim().parse().map_err(|_| {
            ConfigError::invalid(
                "listen.host",
                format!("'{}' is not an IP address", self.listen.host),
            )
        })?;

        if self.console.poll_interval_ms == 0 {
            return Err(ConfigError::invalid(
                "console.poll_interval_ms",
                "must be greater than zero",
            ));
        }

        Ok(BridgeConfig {
            bind: SocketAddr::new(host, self.listen.port),
            poll_interval: Duration::from_millis(self.console.poll_interval_ms),
            input_key: self.input_key()?,
            line_terminator: self.device.line_terminator.clone(),
        })
    }

    /// The configured input key as a single character.
    pub fn input_key(&self) -> Result<char, ConfigError> {
        let mut chars = self.console.input_key.chars();
        let (Some(key), None) = (chars.next(), chars.next()) else {
            return Err(ConfigError::invalid(
                "console.input_key",
                "must be exactly one character",
            ));
        };
        if key.is_whitespace() || key.is_control() {
            return Err(ConfigError::invalid(
                "console.input_key",
                "must be a printable character",
            ));
        }
        if let Some(text) = quick_key(key) {
            return Err(ConfigError::invalid(
                "console.input_key",
                format!("'{key}' is already the quick key for {text}"),
            ));
        }
        Ok(key)
    }

    fn validate_color(&self) -> Result<(), ConfigError> {
        let color = self.console.color.trim();
        if COLOR_CHOICES
            .iter()
            .any(|choice| choice.eq_ignore_ascii_case(color))
        {
            Ok(())
        } else {
            Err(ConfigError::invalid(
                "console.color",
                format!("expected one of {}", COLOR_CHOICES.join(", ")),
            ))
        }
    }

    /// Log file, falling back to [`default_log_path`].
    pub fn log_path(&self) -> PathBuf {
        self.log.file.clone().unwrap_or_else(default_log_path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    fn validation_field(err: ConfigError) -> String {
        match err {
            ConfigError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn defaults_match_the_device_protocol() {
        let bridge = Config::default().to_bridge_config().unwrap();
        assert_eq!(bridge, BridgeConfig::default());
    }

    #[test]
    fn file_then_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "fanlink.toml",
                r#"
                [listen]
                host = "127.0.0.1"
                port = 9000

                [console]
                input_key = "i"
                "#,
            )?;
            jail.set_env("FANLINK_LISTEN__PORT", "9100");
            jail.set_env("FANLINK_CONSOLE__POLL_INTERVAL_MS", "50");

            let config = load_config(Some(Path::new("fanlink.toml"))).unwrap();
            assert_eq!(config.listen.host, "127.0.0.1");
            assert_eq!(config.listen.port, 9100);
            assert_eq!(config.console.input_key, "i");
            assert_eq!(config.console.poll_interval_ms, 50);
            assert_eq!(config.device.line_terminator, "\n");

            let bridge = config.to_bridge_config().unwrap();
            assert_eq!(bridge.bind, "127.0.0.1:9100".parse().unwrap());
            assert_eq!(bridge.poll_interval, Duration::from_millis(50));
            assert_eq!(bridge.input_key, 'i');
            Ok(())
        });
    }

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|_jail| {
            let config = load_config(Some(Path::new("does-not-exist.toml"))).unwrap();
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.listen.port = 8181;
        config.device.line_terminator = "\r\n".into();
        save_config(&config, &path).unwrap();

        let loaded: Config = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn rejects_multi_character_input_key() {
        let mut config = Config::default();
        config.console.input_key = "rr".into();
        assert_eq!(
            validation_field(config.to_bridge_config().unwrap_err()),
            "console.input_key"
        );

        config.console.input_key = String::new();
        assert!(config.to_bridge_config().is_err());
    }

    #[test]
    fn rejects_input_key_that_shadows_a_quick_key() {
        let mut config = Config::default();
        config.console.input_key = "A".into();
        let err = config.to_bridge_config().unwrap_err();
        assert!(err.to_string().contains("quick key for AUTO"));
    }

    #[test]
    fn rejects_zero_poll_interval() {
        let mut config = Config::default();
        config.console.poll_interval_ms = 0;
        assert_eq!(
            validation_field(config.to_bridge_config().unwrap_err()),
            "console.poll_interval_ms"
        );
    }

    #[test]
    fn rejects_hostnames() {
        let mut config = Config::default();
        config.listen.host = "fan.local".into();
        assert_eq!(
            validation_field(config.to_bridge_config().unwrap_err()),
            "listen.host"
        );
    }

    #[test]
    fn rejects_unknown_color_choice() {
        let mut config = Config::default();
        config.console.color = "sometimes".into();
        assert_eq!(
            validation_field(config.to_bridge_config().unwrap_err()),
            "console.color"
        );
    }

    #[test]
    fn color_choice_ignores_case() {
        Jail::expect_with(|jail| {
            jail.set_env("FANLINK_CONSOLE__COLOR", "Never");
            let config = load_config(Some(Path::new("absent.toml"))).unwrap();
            assert!(config.to_bridge_config().is_ok());
            Ok(())
        });

        let mut config = Config::default();
        config.console.color = "ALWAYS".into();
        assert!(config.to_bridge_config().is_ok());
    }

    #[test]
    fn explicit_log_file_wins() {
        let mut config = Config::default();
        config.log.file = Some(PathBuf::from("/tmp/fan.log"));
        assert_eq!(config.log_path(), PathBuf::from("/tmp/fan.log"));
    }
}
