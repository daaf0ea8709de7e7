use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use sagesim_cli::cli::Cli;
use sagesim_cli::commands::load_or_default;
use sagesim_cli::logging::init_tracing;
use sagesim_core::config::GeneralConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // A broken config is reported by the command itself; logging falls back to defaults.
    let mut general = load_or_default(&cli.config)
        .await
        .map(|config| config.general)
        .unwrap_or_else(|_| GeneralConfig::default());
    if let Some(level) = &cli.log_level {
        general.log_level.clone_from(level);
    }

    if let Err(e) = init_tracing(&general) {
        eprintln!("{} {e}", "warning:".yellow().bold());
    }

    tracing::debug!(config = %cli.config.display(), "sagesim starting");

    match sagesim_cli::execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}
