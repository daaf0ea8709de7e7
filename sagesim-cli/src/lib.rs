//! sagesim command-line interface
//!
//! The binary in `main.rs` is a thin wrapper over [`execute`]; the command
//! modules are public so integration tests can drive them directly.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;

use cli::{Cli, Commands};
use error::CliError;
use output::OutputWriter;

/// Run the parsed command line.
pub async fn execute(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Run(args) => commands::run::execute(args, &cli.config, &writer).await,
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
        Commands::InstanceTypes => commands::instance_types::execute(&cli.config, &writer).await,
    }
}
