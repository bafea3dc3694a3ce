//! Error types for stream registration and resolution.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for stream operations.
pub type StreamResult<T> = Result<T, StreamError>;

/// Errors raised by the namespace registry and the resolver.
///
/// Registration errors ([`DuplicateNamespace`](Self::DuplicateNamespace),
/// [`InvalidAccessConfig`](Self::InvalidAccessConfig)) mean the registry is
/// malformed and initialization should stop. Resolution errors are returned to
/// the caller, which decides whether a missing path is fatal.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The namespace is not registered.
    #[error("unknown stream namespace '{0}'")]
    UnknownNamespace(String),

    /// A namespace with this name is already registered.
    #[error("stream namespace '{0}' is already registered")]
    DuplicateNamespace(String),

    /// A writable namespace does not resolve to exactly one physical root.
    #[error("writable stream '{namespace}' must have exactly one root, found {roots}")]
    InvalidAccessConfig { namespace: String, roots: usize },

    /// No sub-path key matches and no root key is declared.
    #[error("stream '{namespace}' has no prefix matching '{path}'")]
    NoMatchingSubPath { namespace: String, path: String },

    /// Reference expansion exceeded the configured depth.
    #[error("stream reference chain exceeded depth {depth}: {}", chain.join(" -> "))]
    CyclicReference { depth: usize, chain: Vec<String> },

    /// None of the candidates exist.
    #[error("'{reference}' not found in {candidates} candidate location(s)")]
    NotFound { reference: String, candidates: usize },

    /// The target is not a writable namespace.
    #[error("'{reference}' is not writable")]
    NotWritable { reference: String },

    /// The relative path tries to leave its declared root.
    #[error("path '{path}' escapes its stream root")]
    PathEscape { path: String },

    /// The cache directory could not be prepared.
    #[error("failed to prepare cache directory {}: {source}", path.display())]
    CacheDirectory { path: PathBuf, source: io::Error },
}

impl StreamError {
    /// Whether this error can only come from a malformed registry.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownNamespace(_)
                | Self::DuplicateNamespace(_)
                | Self::InvalidAccessConfig { .. }
                | Self::CyclicReference { .. }
                | Self::CacheDirectory { .. }
        )
    }
}
