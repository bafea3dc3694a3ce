//! INI configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use ini::Ini;
use tracing::debug;

use super::error::ConfigError;
use crate::stream::{AccessClass, PrefixEntry, PrefixMap, DEFAULT_MAX_DEPTH};

/// Key that stands for the root (empty) sub-path in path sections.
pub const ROOT_KEY: &str = "root";

/// Path families supplied by the platform, in registration order.
pub const PATH_FAMILIES: &[&str] = &["themes", "theme", "assets", "media", "engines", "engine"];

const PLATFORM_SECTION: &str = "platform";
const RESOLVER_SECTION: &str = "resolver";
const LOGGING_SECTION: &str = "logging";
const PATHS_PREFIX: &str = "paths.";
const STREAM_PREFIX: &str = "stream.";

/// Get the configuration directory (`~/.streamlayer`).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".streamlayer")
}

/// Get the default configuration file path.
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

/// `[platform]` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformSettings {
    /// Installation root; relative literal paths are resolved against it.
    pub root: Option<PathBuf>,

    /// Writable cache directory.
    pub cache: PathBuf,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            root: None,
            cache: dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("streamlayer"),
        }
    }
}

/// `[resolver]` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverSettings {
    /// Maximum nested namespace references.
    pub max_depth: usize,

    /// Check candidate existence in parallel.
    pub parallel_probe: bool,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            parallel_probe: false,
        }
    }
}

/// `[logging]` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Default filter directive (e.g. `info`, `streamlayer=debug`).
    pub level: String,

    /// Optional log file; stderr only when unset.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
        }
    }
}

/// `[paths.*]` sections: search locations supplied by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathSettings {
    pub themes: PrefixMap,
    pub theme: PrefixMap,
    pub assets: PrefixMap,
    pub media: PrefixMap,
    pub engines: PrefixMap,
    pub engine: PrefixMap,
}

impl PathSettings {
    /// Get a path family by name.
    pub fn family(&self, name: &str) -> Option<&PrefixMap> {
        match name {
            "themes" => Some(&self.themes),
            "theme" => Some(&self.theme),
            "assets" => Some(&self.assets),
            "media" => Some(&self.media),
            "engines" => Some(&self.engines),
            "engine" => Some(&self.engine),
            _ => None,
        }
    }

    fn family_mut(&mut self, name: &str) -> Option<&mut PrefixMap> {
        match name {
            "themes" => Some(&mut self.themes),
            "theme" => Some(&mut self.theme),
            "assets" => Some(&mut self.assets),
            "media" => Some(&mut self.media),
            "engines" => Some(&mut self.engines),
            "engine" => Some(&mut self.engine),
            _ => None,
        }
    }
}

/// `[stream.NAME]` section: an extra namespace, or extra prefixes for an
/// existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSettings {
    pub name: String,
    pub access: AccessClass,
    pub prefixes: PrefixMap,
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub platform: PlatformSettings,
    pub resolver: ResolverSettings,
    pub logging: LoggingSettings,
    pub paths: PathSettings,
    pub streams: Vec<StreamSettings>,
}

impl ConfigFile {
    /// Load from a file, or defaults if the file is missing.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    /// Load from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Self::from_ini(&ini)
    }

    /// Parse configuration text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::from_ini(&ini)
    }

    /// Save to a specific file, creating its directory.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::WriteFailed {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        self.to_ini()
            .write_to_file(path)
            .map_err(|source| ConfigError::WriteFailed {
                path: path.to_path_buf(),
                source,
            })
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(section) = ini.section(Some(PLATFORM_SECTION)) {
            if let Some(root) = non_empty(section.get("root")) {
                config.platform.root = Some(PathBuf::from(root));
            }
            if let Some(cache) = non_empty(section.get("cache")) {
                config.platform.cache = PathBuf::from(cache);
            }
        }

        if let Some(section) = ini.section(Some(RESOLVER_SECTION)) {
            if let Some(value) = section.get("max_depth") {
                config.resolver.max_depth = parse_depth(value)?;
            }
            if let Some(value) = section.get("parallel_probe") {
                config.resolver.parallel_probe = parse_bool(value).ok_or_else(|| {
                    ConfigError::invalid(
                        RESOLVER_SECTION,
                        "parallel_probe",
                        value,
                        "expected a boolean",
                    )
                })?;
            }
        }

        if let Some(section) = ini.section(Some(LOGGING_SECTION)) {
            if let Some(level) = non_empty(section.get("level")) {
                config.logging.level = level.to_string();
            }
            if let Some(file) = non_empty(section.get("file")) {
                config.logging.file = Some(PathBuf::from(file));
            }
        }

        for (name, properties) in ini.iter() {
            let Some(name) = name else { continue };

            if let Some(family) = name.strip_prefix(PATHS_PREFIX) {
                let map = config
                    .paths
                    .family_mut(family)
                    .ok_or_else(|| ConfigError::UnknownKey(name.to_string()))?;
                for (key, value) in properties.iter() {
                    map.insert(sub_path_key(key), parse_prefixes(name, key, value)?);
                }
            } else if let Some(stream) = name.strip_prefix(STREAM_PREFIX) {
                let mut settings = StreamSettings {
                    name: stream.to_string(),
                    access: AccessClass::ReadOnly,
                    prefixes: PrefixMap::new(),
                };
                for (key, value) in properties.iter() {
                    if key == "access" {
                        settings.access = AccessClass::from_config_str(value).ok_or_else(|| {
                            ConfigError::invalid(
                                name,
                                key,
                                value,
                                "expected 'readonly' or 'writable'",
                            )
                        })?;
                    } else {
                        settings
                            .prefixes
                            .insert(sub_path_key(key), parse_prefixes(name, key, value)?);
                    }
                }
                config.streams.push(settings);
            }
        }

        Ok(config)
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();

        {
            let mut section = ini.with_section(Some(PLATFORM_SECTION));
            if let Some(root) = &self.platform.root {
                section.set("root", root.display().to_string());
            }
            section.set("cache", self.platform.cache.display().to_string());
        }

        ini.with_section(Some(RESOLVER_SECTION))
            .set("max_depth", self.resolver.max_depth.to_string())
            .set("parallel_probe", self.resolver.parallel_probe.to_string());

        {
            let mut section = ini.with_section(Some(LOGGING_SECTION));
            section.set("level", self.logging.level.clone());
            if let Some(file) = &self.logging.file {
                section.set("file", file.display().to_string());
            }
        }

        for family in PATH_FAMILIES {
            let Some(map) = self.paths.family(family) else {
                continue;
            };
            if map.is_empty() {
                continue;
            }
            let section_name = format!("{}{}", PATHS_PREFIX, family);
            write_prefix_map(&mut ini, &section_name, map);
        }

        for stream in &self.streams {
            let section_name = format!("{}{}", STREAM_PREFIX, stream.name);
            ini.with_section(Some(section_name.as_str()))
                .set("access", stream.access.to_string());
            write_prefix_map(&mut ini, &section_name, &stream.prefixes);
        }

        ini
    }
}

fn write_prefix_map(ini: &mut Ini, section_name: &str, map: &PrefixMap) {
    let mut section = ini.with_section(Some(section_name));
    for sub_path in map.sub_paths() {
        let key = if sub_path.key.is_empty() {
            ROOT_KEY
        } else {
            sub_path.key.as_str()
        };
        let value = sub_path
            .entries
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        section.set(key, value);
    }
}

fn sub_path_key(key: &str) -> &str {
    if key == ROOT_KEY {
        ""
    } else {
        key
    }
}

/// Parse a comma-separated list of prefix specifications.
pub fn parse_prefixes(
    section: &str,
    key: &str,
    value: &str,
) -> Result<Vec<PrefixEntry>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|spec| {
            PrefixEntry::parse(spec)
                .map_err(|e| ConfigError::invalid(section, key, spec, e.to_string()))
        })
        .collect()
}

pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

pub(crate) fn parse_depth(value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(depth) if depth > 0 => Ok(depth),
        _ => Err(ConfigError::invalid(
            RESOLVER_SECTION,
            "max_depth",
            value,
            "expected a positive integer",
        )),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
