//! CLI error type and exit codes.

use streamlayer::config::ConfigError;
use streamlayer::logging::LoggingError;
use streamlayer::stream::StreamError;
use thiserror::Error;

/// Errors reported to the user by the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid configuration request (unknown key and the like).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration could not be loaded, edited or saved.
    #[error("Configuration error: {0}")]
    ConfigFile(#[from] ConfigError),

    /// Logging could not be initialized.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// The registry could not be built.
    #[error("Invalid stream configuration: {0}")]
    Registry(StreamError),

    /// A reference could not be resolved.
    #[error("{0}")]
    Resolve(#[from] StreamError),

    /// Output could not be serialized.
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),

    /// One or more references do not exist.
    #[error("{0} reference(s) not found")]
    Missing(usize),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Missing(_) | CliError::Resolve(_) => 1,
            CliError::Config(_) | CliError::ConfigFile(_) | CliError::Registry(_) => 2,
            CliError::Logging(_) | CliError::Output(_) => 3,
        }
    }
}
