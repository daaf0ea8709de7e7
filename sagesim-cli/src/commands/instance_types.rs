//! `sagesim instance-types` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::commands::load_or_default;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `instance-types` command.
pub async fn execute(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    let config = load_or_default(config_path).await?;
    let report = InstanceTypesReport {
        count: config.sagemaker.instance_types.len(),
        instance_types: config.sagemaker.instance_types,
    };
    writer.render(&report)
}

/// Accepted notebook instance types.
#[derive(Debug, Serialize)]
pub struct InstanceTypesReport {
    pub count: usize,
    pub instance_types: Vec<String>,
}

impl Render for InstanceTypesReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        for instance_type in &self.instance_types {
            writeln!(w, "{instance_type}")?;
        }
        Ok(())
    }
}
