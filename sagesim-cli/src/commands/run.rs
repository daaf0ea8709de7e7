//! `sagesim run` command handler
//!
//! Replays a JSON request script against one fresh in-memory registry.

use std::io::Write;
use std::path::Path;

use metrics_exporter_prometheus::PrometheusBuilder;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use sagesim_core::config::SimConfig;
use sagesim_core::types::Scope;
use sagesim_sagemaker::dispatch::Reply;
use sagesim_sagemaker::{BackendRegistry, handle};

use crate::cli::RunArgs;
use crate::commands::load_or_default;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `run` command.
pub async fn execute(
    args: RunArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = load_or_default(config_path).await?;
    let requests = read_script(&args.script).await?;
    let scope = Scope::new(
        args.account
            .unwrap_or_else(|| config.account.account_id.clone()),
        args.region.unwrap_or_else(|| config.account.region.clone()),
    );

    info!(
        script = %args.script.display(),
        requests = requests.len(),
        scope = %scope,
        "replaying request script"
    );

    let report = if args.metrics {
        replay_with_metrics(&config, &scope, requests, args.fail_fast)
    } else {
        replay(&config, &scope, requests, args.fail_fast)
    };
    writer.render(&report)?;

    if args.fail_fast {
        if let Some(entry) = report.replies.iter().find(|e| e.reply.is_error()) {
            return Err(CliError::RequestFailed {
                index: entry.index,
                action: entry.action.clone(),
                message: entry
                    .reply
                    .error()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            });
        }
    }
    Ok(())
}

/// Read and parse a request script file.
pub async fn read_script(path: &Path) -> Result<Vec<Value>, CliError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CliError::Script(format!("{}: {e}", path.display())))?;
    parse_script(&content)
}

/// Parse script content: a JSON array of request objects, or a single object.
pub fn parse_script(content: &str) -> Result<Vec<Value>, CliError> {
    let value: Value =
        serde_json::from_str(content).map_err(|e| CliError::Script(e.to_string()))?;
    match value {
        Value::Array(items) => {
            if let Some(position) = items.iter().position(|item| !item.is_object()) {
                return Err(CliError::Script(format!(
                    "entry #{} is not a JSON object",
                    position + 1
                )));
            }
            Ok(items)
        }
        Value::Object(_) => Ok(vec![value]),
        _ => Err(CliError::Script(
            "expected a JSON object or an array of objects".to_owned(),
        )),
    }
}

/// Dispatch every request in order against a fresh registry.
///
/// With `fail_fast`, replay stops after the first error reply.
pub fn replay(config: &SimConfig, scope: &Scope, requests: Vec<Value>, fail_fast: bool) -> RunReport {
    let mut registry = BackendRegistry::from_config(config);
    let mut replies = Vec::with_capacity(requests.len());

    for (i, request) in requests.into_iter().enumerate() {
        let reply = handle(&mut registry, scope, request);
        let failed = reply.is_error();
        replies.push(RunEntry {
            index: i + 1,
            action: reply.action.clone(),
            reply,
        });
        if failed && fail_fast {
            warn!(index = i + 1, "stopping replay at first failed request");
            break;
        }
    }

    RunReport::new(replies)
}

/// Like [`replay`], recording metrics into a Prometheus recorder scoped to this replay.
///
/// The rendered exposition text is attached to the report.
pub fn replay_with_metrics(
    config: &SimConfig,
    scope: &Scope,
    requests: Vec<Value>,
    fail_fast: bool,
) -> RunReport {
    let recorder = PrometheusBuilder::new().build_recorder();
    let prometheus = recorder.handle();

    let mut report = metrics::with_local_recorder(&recorder, || {
        sagesim_core::metrics::describe_all();
        replay(config, scope, requests, fail_fast)
    });
    report.metrics = Some(prometheus.render());
    report
}

/// One replayed request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RunEntry {
    /// 1-based position in the script
    pub index: usize,
    pub action: String,
    #[serde(rename = "Response")]
    pub reply: Reply,
}

/// Result of a script replay.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RunReport {
    pub succeeded: usize,
    pub failed: usize,
    pub replies: Vec<RunEntry>,
    /// Prometheus exposition text, present with `--metrics`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<String>,
}

impl RunReport {
    fn new(replies: Vec<RunEntry>) -> Self {
        let failed = replies.iter().filter(|e| e.reply.is_error()).count();
        Self {
            succeeded: replies.len() - failed,
            failed,
            replies,
            metrics: None,
        }
    }
}

impl Render for RunReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        for entry in &self.replies {
            let reply = &entry.reply;
            match reply.error() {
                None => {
                    writeln!(w, "[{}] {} {}", entry.index, entry.action, "OK".green())?;
                    let body = serde_json::to_string(&reply.body).map_err(std::io::Error::other)?;
                    if body != "{}" {
                        writeln!(w, "    {body}")?;
                    }
                }
                Some(err) => {
                    writeln!(
                        w,
                        "[{}] {} {} {}",
                        entry.index,
                        entry.action,
                        "FAILED".red().bold(),
                        err.to_string().red()
                    )?;
                }
            }
        }

        writeln!(
            w,
            "{} requests, {} succeeded, {} failed",
            self.replies.len(),
            self.succeeded,
            self.failed
        )?;

        if let Some(metrics) = &self.metrics {
            writeln!(w)?;
            write!(w, "{metrics}")?;
        }
        Ok(())
    }
}
