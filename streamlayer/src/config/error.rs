//! Configuration error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading, editing or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read or parsed.
    #[error("failed to read config file {}: {reason}", path.display())]
    ReadFailed { path: PathBuf, reason: String },

    /// The configuration text is not valid INI.
    #[error("failed to parse configuration: {0}")]
    ParseFailed(String),

    /// The configuration file could not be written.
    #[error("failed to write config file {}: {source}", path.display())]
    WriteFailed { path: PathBuf, source: io::Error },

    /// A setting has a value that cannot be used.
    #[error("invalid value '{value}' for {section}.{key}: {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// The configuration key does not exist.
    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),
}

impl ConfigError {
    pub(crate) fn invalid(
        section: &str,
        key: &str,
        value: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
