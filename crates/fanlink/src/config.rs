//! CLI configuration: thin wrapper around `fanlink_config`.
//!
//! Loads the layered config and applies command-line overrides on top
//! (flag > env > file > defaults).

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use fanlink_core::BridgeConfig;

use crate::cli::{ColorMode, GlobalOpts, SessionOpts};
use crate::error::CliError;

pub use fanlink_config::{Config, save_config};

/// Config file in effect: `--config` or the platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(fanlink_config::config_path)
}

/// Load the config file plus `FANLINK_*` environment, then apply flags.
pub fn load(global: &GlobalOpts, session: &SessionOpts) -> Result<Config, CliError> {
    let mut cfg = fanlink_config::load_config(Some(&config_path(global)))?;
    apply_overrides(&mut cfg, global, session);
    Ok(cfg)
}

fn apply_overrides(cfg: &mut Config, global: &GlobalOpts, session: &SessionOpts) {
    if let Some(host) = &session.host {
        cfg.listen.host.clone_from(host);
    }
    if let Some(port) = session.port {
        cfg.listen.port = port;
    }
    if let Some(key) = &session.input_key {
        cfg.console.input_key.clone_from(key);
    }
    if let Some(interval) = session.poll_interval {
        cfg.console.poll_interval_ms = interval_millis(interval);
    }
    if let Some(color) = global.color {
        cfg.console.color = color_name(color).into();
    }
    if let Some(file) = &global.log_file {
        cfg.log.file = Some(file.clone());
    }
}

/// Whole milliseconds, rounding up so a non-zero interval never becomes 0.
fn interval_millis(interval: Duration) -> u64 {
    u64::try_from(interval.as_micros().div_ceil(1000)).unwrap_or(u64::MAX)
}

fn color_name(mode: ColorMode) -> &'static str {
    match mode {
        ColorMode::Auto => "auto",
        ColorMode::Always => "always",
        ColorMode::Never => "never",
    }
}

/// The configured color mode.
pub fn color_mode(cfg: &Config) -> Result<ColorMode, CliError> {
    ColorMode::from_str(cfg.console.color.trim(), true).map_err(|reason| CliError::Validation {
        field: "console.color".into(),
        reason,
    })
}

/// Validated runtime settings for the session.
pub fn bridge_config(cfg: &Config) -> Result<BridgeConfig, CliError> {
    Ok(cfg.to_bridge_config()?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn global() -> GlobalOpts {
        GlobalOpts {
            config: None,
            color: None,
            log_file: None,
            verbose: 0,
        }
    }

    #[test]
    fn flags_override_file_values() {
        let mut cfg = Config::default();
        let session = SessionOpts {
            host: Some("127.0.0.1".into()),
            port: Some(9001),
            input_key: Some("i".into()),
            poll_interval: Some(Duration::from_millis(250)),
        };
        let mut global = global();
        global.color = Some(ColorMode::Never);

        apply_overrides(&mut cfg, &global, &session);

        let bridge = bridge_config(&cfg).unwrap();
        assert_eq!(bridge.bind, "127.0.0.1:9001".parse().unwrap());
        assert_eq!(bridge.input_key, 'i');
        assert_eq!(bridge.poll_interval, Duration::from_millis(250));
        assert_eq!(color_mode(&cfg).unwrap(), ColorMode::Never);
    }

    #[test]
    fn sub_millisecond_poll_interval_rounds_up() {
        let mut cfg = Config::default();
        let session = SessionOpts {
            poll_interval: Some(Duration::from_micros(500)),
            ..SessionOpts::default()
        };

        apply_overrides(&mut cfg, &global(), &session);

        assert_eq!(cfg.console.poll_interval_ms, 1);
        assert_eq!(
            bridge_config(&cfg).unwrap().poll_interval,
            Duration::from_millis(1)
        );
        assert_eq!(interval_millis(Duration::from_micros(1500)), 2);
        assert_eq!(interval_millis(Duration::ZERO), 0);
    }

    #[test]
    fn mixed_case_color_from_config_is_accepted() {
        let mut cfg = Config::default();
        cfg.console.color = "Always".into();
        assert!(bridge_config(&cfg).is_ok());
        assert_eq!(color_mode(&cfg).unwrap(), ColorMode::Always);
    }

    #[test]
    fn unset_flags_leave_config_alone() {
        let mut cfg = Config::default();
        apply_overrides(&mut cfg, &global(), &SessionOpts::default());
        assert_eq!(cfg, Config::default());
    }
}
