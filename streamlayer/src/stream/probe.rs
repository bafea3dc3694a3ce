//! Existence checks against backing storage.

use std::path::Path;

/// Answers whether a physical path exists.
///
/// The resolver only needs this one question answered, so tests and
/// non-local storage can supply their own implementation.
pub trait PathProbe: Send + Sync {
    /// Check if the path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Probe backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl PathProbe for LocalFilesystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

impl<F> PathProbe for F
where
    F: Fn(&Path) -> bool + Send + Sync,
{
    fn exists(&self, path: &Path) -> bool {
        self(path)
    }
}
