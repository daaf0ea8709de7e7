//! CLI-specific error types and exit code mapping

use sagesim_core::error::SimError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// The request script could not be read as JSON requests.
    #[error("invalid script: {0}")]
    Script(String),

    /// A replayed request failed while `--fail-fast` was set.
    #[error("request #{index} ({action}) failed: {message}")]
    RequestFailed {
        index: usize,
        action: String,
        message: String,
    },

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from sagesim-core.
    #[error("{0}")]
    Core(#[from] SimError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                          |
    /// |------|----------------------------------|
    /// | 0    | Success                          |
    /// | 1    | Command error / failed request   |
    /// | 2    | Configuration error              |
    /// | 3    | Script unreadable or malformed   |
    /// | 10   | IO error                         |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(SimError::Config(_)) => 2,
            Self::Script(_) => 3,
            Self::Io(_) | Self::Core(SimError::Io(_)) => 10,
            Self::RequestFailed { .. }
            | Self::JsonSerialize(_)
            | Self::Command(_)
            | Self::Core(SimError::Service(_)) => 1,
        }
    }
}
