//! Config subcommand handlers.

use std::io::IsTerminal;

use dialoguer::{Confirm, Input};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, SessionOpts};
use crate::config::{self, Config};
use crate::error::CliError;

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn interactive() -> bool {
    std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
}

/// Ask for the few settings worth changing on a first run.
fn prompt_settings(cfg: &mut Config) -> Result<(), CliError> {
    cfg.listen.host = Input::new()
        .with_prompt("Listen address")
        .default(cfg.listen.host.clone())
        .interact_text()
        .map_err(prompt_err)?;

    cfg.listen.port = Input::new()
        .with_prompt("UDP port")
        .default(cfg.listen.port)
        .interact_text()
        .map_err(prompt_err)?;

    cfg.console.input_key = Input::new()
        .with_prompt("Command prompt key")
        .default(cfg.console.input_key.clone())
        .interact_text()
        .map_err(prompt_err)?;

    Ok(())
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_path(global);

    match args.command {
        ConfigCommand::Path => {
            println!("{}", path.display());
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load(global, &SessionOpts::default())?;
            if path.exists() {
                println!("# {}", path.display());
            } else {
                println!("# {} (not found, showing defaults)", path.display());
            }
            print!("{}", toml::to_string_pretty(&cfg)?);
            println!("# log file: {}", cfg.log_path().display());
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let interactive = interactive();
            if path.exists() && !force {
                let overwrite = interactive
                    && Confirm::new()
                        .with_prompt(format!("{} exists. Overwrite?", path.display()))
                        .default(false)
                        .interact()
                        .map_err(prompt_err)?;
                if !overwrite {
                    return Err(CliError::ConfigExists {
                        path: path.display().to_string(),
                    });
                }
            }

            let mut cfg = Config::default();
            if interactive {
                prompt_settings(&mut cfg)?;
            }
            // Refuse to write a file the session would reject.
            cfg.to_bridge_config()?;

            config::save_config(&cfg, &path)?;
            eprintln!("✓ Config written to {}", path.display());
            Ok(())
        }
    }
}
