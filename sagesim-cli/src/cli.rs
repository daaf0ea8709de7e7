//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// sagesim -- in-memory SageMaker notebook instance simulator.
///
/// Use `sagesim <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "sagesim", version, about, long_about = None)]
pub struct Cli {
    /// Path to the sagesim.toml configuration file.
    #[arg(short, long, default_value = "sagesim.toml", global = true)]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a JSON request script against a fresh simulator.
    Run(RunArgs),

    /// Manage configuration.
    Config(ConfigArgs),

    /// List the notebook instance types the simulator accepts.
    InstanceTypes,
}

// ---- run ----

/// Replay a request script.
///
/// The script is a JSON array of request objects (or a single object),
/// each carrying an `Action` field, e.g.
/// `{"Action": "CreateNotebookInstance", "NotebookInstanceName": "nb", ...}`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the JSON request script.
    pub script: PathBuf,

    /// Default account ID for requests without `AccountId`.
    #[arg(long)]
    pub account: Option<String>,

    /// Default region for requests without `Region`.
    #[arg(long)]
    pub region: Option<String>,

    /// Stop at the first failed request and exit non-zero.
    #[arg(long)]
    pub fail_fast: bool,

    /// Append a Prometheus snapshot of the metrics recorded during replay.
    #[arg(long)]
    pub metrics: bool,
}

// ---- config ----

/// Manage sagesim configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, account, sagemaker).
        #[arg(long)]
        section: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_run_with_flags() {
        let cli = Cli::try_parse_from([
            "sagesim",
            "run",
            "script.json",
            "--account",
            "111122223333",
            "--region",
            "eu-west-1",
            "--fail-fast",
        ])
        .expect("should parse");
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.script, PathBuf::from("script.json"));
                assert_eq!(args.account.as_deref(), Some("111122223333"));
                assert_eq!(args.region.as_deref(), Some("eu-west-1"));
                assert!(args.fail_fast);
            }
            other => panic!("expected Run, got {other:?}"),
        }
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "sagesim",
            "instance-types",
            "--output",
            "json",
            "--log-level",
            "debug",
        ])
        .expect("should parse");
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(cli.command, Commands::InstanceTypes));
    }

    #[test]
    fn default_config_path() {
        let cli = Cli::try_parse_from(["sagesim", "config", "validate"]).expect("should parse");
        assert_eq!(cli.config, PathBuf::from("sagesim.toml"));
    }

    #[test]
    fn parse_config_show_section() {
        let cli = Cli::try_parse_from(["sagesim", "config", "show", "--section", "account"])
            .expect("should parse");
        match cli.command {
            Commands::Config(ConfigArgs {
                action: ConfigAction::Show { section },
            }) => assert_eq!(section.as_deref(), Some("account")),
            other => panic!("expected config show, got {other:?}"),
        }
    }

    #[test]
    fn run_requires_script() {
        assert!(Cli::try_parse_from(["sagesim", "run"]).is_err());
    }

    #[test]
    fn invalid_output_format_is_rejected() {
        assert!(Cli::try_parse_from(["sagesim", "--output", "yaml", "instance-types"]).is_err());
    }
}
