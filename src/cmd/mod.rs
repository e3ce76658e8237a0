//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`], [`validate`], or [`health`]. Each
//! handler lives in its own submodule.

pub mod health;
pub mod run;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::error::CorrelatorError;

pub async fn dispatch(cli: Cli) -> Result<(), CorrelatorError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(*args).await,
        Some(Commands::Validate(ref args)) => validate::execute(args),
        Some(Commands::Health(args)) => health::execute(args).await,
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  correlator v{version} \u{2014} correlation ID middleware\n\n  \
         No command provided. To get started:\n\n    \
         correlator run                        Start the demo server with default settings\n    \
         correlator run -c correlator.yaml     Start with a settings file\n    \
         correlator validate correlator.yaml   Check a settings file\n    \
         correlator --help                     See all commands and options\n"
    );
}
