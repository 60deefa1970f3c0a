//! Command dispatch: bridges CLI args to the session or a utility handler.

pub mod config_cmd;
pub mod session;

use clap::CommandFactory;
use clap_complete::generate;

use crate::cli::{Cli, Command, CompletionsArgs, GlobalOpts};
use crate::error::CliError;

/// Dispatch a subcommand to its handler.
pub fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Config(args) => config_cmd::handle(args, global),
        Command::Completions(args) => {
            completions(&args);
            Ok(())
        }
    }
}

fn completions(args: &CompletionsArgs) {
    let mut cmd = Cli::command();
    generate(args.shell, &mut cmd, "fanlink", &mut std::io::stdout());
}
