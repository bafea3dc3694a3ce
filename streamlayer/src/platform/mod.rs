//! Platform path providers and registry construction.
//!
//! A [`Platform`] supplies the physical directories of one deployment (where
//! themes, assets and engines live, where the cache goes). The built-in stream
//! table is layered on top of those directories by [`build_registry`].
//!
//! # Example
//!
//! ```ignore
//! use streamlayer::platform::{build_registry, ConfiguredPlatform};
//! use streamlayer::stream::StreamResolver;
//!
//! let platform = ConfiguredPlatform::new(ConfigFile::load()?);
//! let registry = build_registry(&platform)?;
//! let resolver = StreamResolver::new(registry.into_shared());
//! ```

mod builtin;
mod configured;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::stream::{AccessClass, PrefixMap};

pub use builtin::{
    build_registry, build_registry_with, ADMIN, ASSETS, BLUEPRINTS, BUILTIN_STREAMS, CACHE,
    CONFIG, ENGINE, ENGINES, LAYOUTS, MEDIA, PARTICLES, THEME, THEMES,
};
pub use configured::ConfiguredPlatform;

/// A namespace contributed by the platform beyond the built-in table.
///
/// If the name is already registered, the prefixes are appended to the
/// existing namespace instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDeclaration {
    pub name: String,
    pub access: AccessClass,
    pub prefixes: PrefixMap,
}

impl StreamDeclaration {
    /// Create a new declaration.
    pub fn new(name: impl Into<String>, access: AccessClass, prefixes: PrefixMap) -> Self {
        Self {
            name: name.into(),
            access,
            prefixes,
        }
    }
}

/// Physical directories of one deployment.
pub trait Platform {
    /// Writable cache directory.
    fn cache_path(&self) -> PathBuf;

    /// Directories containing all installed themes.
    fn themes_paths(&self) -> PrefixMap;

    /// Directories of the selected theme.
    fn theme_paths(&self) -> PrefixMap {
        PrefixMap::root(Vec::new())
    }

    /// System-defined media files.
    fn assets_paths(&self) -> PrefixMap;

    /// User-defined media files.
    fn media_paths(&self) -> PrefixMap;

    /// Directories containing all engines.
    fn engines_paths(&self) -> PrefixMap {
        PrefixMap::root(Vec::new())
    }

    /// Directories of the engine that renders the selected theme.
    fn engine_paths(&self) -> PrefixMap {
        PrefixMap::root(Vec::new())
    }

    /// Installation root for relative paths.
    fn base_dir(&self) -> Option<PathBuf> {
        None
    }

    /// Additional namespaces, or extra prefixes for built-in ones.
    fn extra_streams(&self) -> Vec<StreamDeclaration> {
        Vec::new()
    }

    /// Make sure the cache directory exists. Called once during construction.
    fn ensure_cache_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }
}
