//! Command handlers -- one module per subcommand

pub mod config;
pub mod instance_types;
pub mod run;

use std::path::Path;

use tracing::debug;

use sagesim_core::config::SimConfig;
use sagesim_core::error::{ConfigError, SimError};

use crate::error::CliError;

/// Load the effective configuration for commands that can run without a file.
///
/// A missing config file falls back to built-in defaults; env overrides
/// are applied either way. Parse and validation errors are still reported.
pub async fn load_or_default(path: &Path) -> Result<SimConfig, CliError> {
    match SimConfig::load(path).await {
        Ok(config) => Ok(config),
        Err(SimError::Config(ConfigError::FileNotFound { .. })) => {
            debug!(path = %path.display(), "config file not found, using defaults");
            let mut config = SimConfig::default();
            config.apply_env_overrides();
            config.validate()?;
            Ok(config)
        }
        Err(e) => Err(e.into()),
    }
}
