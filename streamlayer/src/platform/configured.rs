//! Platform described by the configuration file.

use std::path::PathBuf;

use super::{Platform, StreamDeclaration};
use crate::config::ConfigFile;
use crate::stream::{PrefixMap, StreamRegistry};

/// A [`Platform`] whose directories come from `[platform]`, `[paths.*]` and
/// `[stream.*]` sections.
///
/// Path families missing from the file get an empty root chain, so every
/// built-in namespace still exists and simply yields no candidates.
#[derive(Debug, Clone)]
pub struct ConfiguredPlatform {
    config: ConfigFile,
}

impl ConfiguredPlatform {
    /// Create a platform from a loaded configuration.
    pub fn new(config: ConfigFile) -> Self {
        Self { config }
    }

    /// The underlying configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// An empty registry carrying the configured resolver settings.
    pub fn empty_registry(&self) -> StreamRegistry {
        StreamRegistry::new().with_max_depth(self.config.resolver.max_depth)
    }

    fn family(map: &PrefixMap) -> PrefixMap {
        if map.is_empty() {
            PrefixMap::root(Vec::new())
        } else {
            map.clone()
        }
    }
}

impl Platform for ConfiguredPlatform {
    fn cache_path(&self) -> PathBuf {
        self.config.platform.cache.clone()
    }

    fn themes_paths(&self) -> PrefixMap {
        Self::family(&self.config.paths.themes)
    }

    fn theme_paths(&self) -> PrefixMap {
        Self::family(&self.config.paths.theme)
    }

    fn assets_paths(&self) -> PrefixMap {
        Self::family(&self.config.paths.assets)
    }

    fn media_paths(&self) -> PrefixMap {
        Self::family(&self.config.paths.media)
    }

    fn engines_paths(&self) -> PrefixMap {
        Self::family(&self.config.paths.engines)
    }

    fn engine_paths(&self) -> PrefixMap {
        Self::family(&self.config.paths.engine)
    }

    fn base_dir(&self) -> Option<PathBuf> {
        self.config.platform.root.clone()
    }

    fn extra_streams(&self) -> Vec<StreamDeclaration> {
        self.config
            .streams
            .iter()
            .map(|s| StreamDeclaration::new(s.name.clone(), s.access, s.prefixes.clone()))
            .collect()
    }
}
