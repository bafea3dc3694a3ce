//! The built-in stream table.

use tracing::{debug, info, warn};

use super::Platform;
use crate::stream::{
    AccessClass, Position, PrefixEntry, PrefixMap, StreamError, StreamRegistry, StreamResult,
};

/// Cached files.
pub const CACHE: &str = "gantry-cache";
/// Container for all frontend themes.
pub const THEMES: &str = "gantry-themes";
/// Selected frontend theme.
pub const THEME: &str = "gantry-theme";
/// System defined media files.
pub const ASSETS: &str = "gantry-assets";
/// User defined media files.
pub const MEDIA: &str = "gantry-media";
/// Container for all engines.
pub const ENGINES: &str = "gantry-engines";
/// Engine used to render the selected theme.
pub const ENGINE: &str = "gantry-engine";
/// Layout definitions.
pub const LAYOUTS: &str = "gantry-layouts";
/// Particles, from the theme first and the engine second.
pub const PARTICLES: &str = "gantry-particles";
/// Administration; no default locations.
pub const ADMIN: &str = "gantry-admin";
/// Blueprints for the configuration.
pub const BLUEPRINTS: &str = "gantry-blueprints";
/// Configuration of the selected theme.
pub const CONFIG: &str = "gantry-config";

/// Built-in namespaces in registration order.
pub const BUILTIN_STREAMS: &[&str] = &[
    CACHE, THEMES, THEME, ASSETS, MEDIA, ENGINES, ENGINE, LAYOUTS, PARTICLES, ADMIN, BLUEPRINTS,
    CONFIG,
];

/// Build and validate a registry for a platform.
pub fn build_registry(platform: &dyn Platform) -> StreamResult<StreamRegistry> {
    build_registry_with(platform, StreamRegistry::new())
}

/// Build on a pre-configured (e.g. depth-limited) empty registry.
///
/// The cache directory is created through [`Platform::ensure_cache_dir`]
/// before the cache namespace is registered. Any registration or validation
/// error aborts construction.
pub fn build_registry_with(
    platform: &dyn Platform,
    registry: StreamRegistry,
) -> StreamResult<StreamRegistry> {
    let mut registry = match platform.base_dir() {
        Some(base) => registry.with_base_dir(base),
        None => registry,
    };

    let cache_path = platform.cache_path();
    let physical_cache = match registry.base_dir() {
        Some(base) if cache_path.is_relative() => base.join(&cache_path),
        _ => cache_path.clone(),
    };
    platform
        .ensure_cache_dir(&physical_cache)
        .map_err(|source| StreamError::CacheDirectory {
            path: physical_cache.clone(),
            source,
        })?;
    debug!(path = %physical_cache.display(), "Cache directory ready");

    let read_only = AccessClass::ReadOnly;
    registry.register(
        CACHE,
        AccessClass::Writable,
        PrefixMap::root(vec![PrefixEntry::literal(cache_path)]),
    )?;
    registry.register(THEMES, read_only, platform.themes_paths())?;
    registry.register(THEME, read_only, platform.theme_paths())?;
    registry.register(ASSETS, read_only, platform.assets_paths())?;
    registry.register(MEDIA, read_only, platform.media_paths())?;
    registry.register(ENGINES, read_only, platform.engines_paths())?;
    registry.register(ENGINE, read_only, platform.engine_paths())?;
    registry.register(
        LAYOUTS,
        read_only,
        PrefixMap::root(vec![reference(THEME, "layouts")?]),
    )?;
    registry.register(
        PARTICLES,
        read_only,
        PrefixMap::root(vec![
            reference(THEME, "particles")?,
            reference(ENGINE, "particles")?,
        ]),
    )?;
    registry.register(ADMIN, read_only, PrefixMap::new())?;
    registry.register(
        BLUEPRINTS,
        read_only,
        PrefixMap::root(vec![
            reference(ENGINE, "blueprints")?,
            reference(THEME, "blueprints")?,
        ])
        .with("particles", vec![reference(PARTICLES, "")?]),
    )?;
    registry.register(
        CONFIG,
        read_only,
        PrefixMap::root(vec![reference(THEME, "config")?]),
    )?;

    for declaration in platform.extra_streams() {
        match registry.get(&declaration.name).map(|ns| ns.access) {
            Some(existing) => {
                if existing != declaration.access {
                    warn!(
                        namespace = %declaration.name,
                        declared = %declaration.access,
                        registered = %existing,
                        "Ignoring access class of extended stream"
                    );
                }
                for sub_path in declaration.prefixes.sub_paths() {
                    registry.add_prefixes(
                        &declaration.name,
                        &sub_path.key,
                        sub_path.entries.clone(),
                        Position::Append,
                    )?;
                }
            }
            None => {
                registry.register(declaration.name, declaration.access, declaration.prefixes)?
            }
        }
    }

    registry.validate()?;

    let empty: Vec<&str> = registry
        .namespaces()
        .filter(|ns| ns.prefixes.entries().next().is_none())
        .map(|ns| ns.name.as_str())
        .collect();
    if !empty.is_empty() {
        debug!(streams = ?empty, "Streams without search locations");
    }
    info!(
        streams = registry.len(),
        base_dir = ?registry.base_dir(),
        "Stream registry built"
    );

    Ok(registry)
}

fn reference(namespace: &str, path: &str) -> StreamResult<PrefixEntry> {
    PrefixEntry::reference(namespace, path)
}
