//! `sagesim config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use sagesim_core::config::SimConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::commands::load_or_default;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Section names accepted by `config show --section`.
pub const SECTIONS: &[&str] = &["general", "account", "sagemaker"];

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Load and validate the configuration file, reporting any errors.
///
/// Unlike other commands, a missing file is reported as invalid.
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = match SimConfig::load(config_path).await {
        Ok(_) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }
    Ok(())
}

/// Display the effective configuration (file + env overrides + defaults).
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let config = load_or_default(config_path).await?;
    let source = if tokio::fs::try_exists(config_path).await.unwrap_or(false) {
        config_path.display().to_string()
    } else {
        "<defaults>".to_owned()
    };

    let section = section.as_deref();
    let report = ConfigReport {
        source,
        config_toml: section_toml(&config, section)?,
        settings: section_json(&config, section)?,
        section: section.map(str::to_owned),
    };
    writer.render(&report)
}

/// Serialize the whole config or a single section to TOML.
pub fn section_toml(config: &SimConfig, section: Option<&str>) -> Result<String, CliError> {
    let rendered = match section {
        None => toml::to_string_pretty(config),
        Some("general") => toml::to_string_pretty(&config.general),
        Some("account") => toml::to_string_pretty(&config.account),
        Some("sagemaker") => toml::to_string_pretty(&config.sagemaker),
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {other} (expected: {})",
                SECTIONS.join(", ")
            )));
        }
    };
    rendered.map_err(|e| CliError::Command(format!("failed to serialize config: {e}")))
}

/// The same selection as [`section_toml`], as a JSON value for `--output json`.
pub fn section_json(
    config: &SimConfig,
    section: Option<&str>,
) -> Result<serde_json::Value, CliError> {
    let value = serde_json::to_value(config)?;
    match section {
        None => Ok(value),
        Some(name) => value
            .get(name)
            .cloned()
            .ok_or_else(|| CliError::Command(format!("unknown section: {name}"))),
    }
}

/// Effective configuration, as TOML for text output and as JSON otherwise.
#[derive(Serialize)]
pub struct ConfigReport {
    /// `<defaults>` when no file exists
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub settings: serde_json::Value,
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let heading = match &self.section {
            Some(section) => format!("# [{section}] from {}", self.source),
            None => format!("# effective configuration from {}", self.source),
        };
        writeln!(w, "{}", heading.dimmed())?;
        write!(w, "{}", self.config_toml)
    }
}

/// Outcome of `config validate`.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    pub source: String,
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.valid {
            return writeln!(w, "{} {}", self.source.bold(), "ok".green());
        }
        writeln!(w, "{} {}", self.source.bold(), "INVALID".red().bold())?;
        for err in &self.errors {
            writeln!(w, "  - {}", err.red())?;
        }
        Ok(())
    }
}
