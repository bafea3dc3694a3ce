//! Scalar configuration keys addressable as `section.key`.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::error::ConfigError;
use super::file::{parse_bool, parse_depth, ConfigFile};

/// A scalar setting that can be read and written by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    PlatformRoot,
    PlatformCache,
    ResolverMaxDepth,
    ResolverParallelProbe,
    LoggingLevel,
    LoggingFile,
}

impl ConfigKey {
    /// All keys, grouped by section.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::PlatformRoot,
            ConfigKey::PlatformCache,
            ConfigKey::ResolverMaxDepth,
            ConfigKey::ResolverParallelProbe,
            ConfigKey::LoggingLevel,
            ConfigKey::LoggingFile,
        ]
    }

    /// Full name, `section.key`.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// INI section.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::PlatformRoot | ConfigKey::PlatformCache => "platform",
            ConfigKey::ResolverMaxDepth | ConfigKey::ResolverParallelProbe => "resolver",
            ConfigKey::LoggingLevel | ConfigKey::LoggingFile => "logging",
        }
    }

    /// Key within the section.
    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::PlatformRoot => "root",
            ConfigKey::PlatformCache => "cache",
            ConfigKey::ResolverMaxDepth => "max_depth",
            ConfigKey::ResolverParallelProbe => "parallel_probe",
            ConfigKey::LoggingLevel => "level",
            ConfigKey::LoggingFile => "file",
        }
    }

    /// Current value as a string; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::PlatformRoot => optional_path(&config.platform.root),
            ConfigKey::PlatformCache => config.platform.cache.display().to_string(),
            ConfigKey::ResolverMaxDepth => config.resolver.max_depth.to_string(),
            ConfigKey::ResolverParallelProbe => config.resolver.parallel_probe.to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingFile => optional_path(&config.logging.file),
        }
    }

    /// Set the value from a string. An empty value clears optional keys.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let trimmed = value.trim();
        match self {
            ConfigKey::PlatformRoot => config.platform.root = optional(trimmed),
            ConfigKey::PlatformCache => {
                if trimmed.is_empty() {
                    return Err(self.invalid(value, "cache directory cannot be empty"));
                }
                config.platform.cache = PathBuf::from(trimmed);
            }
            ConfigKey::ResolverMaxDepth => config.resolver.max_depth = parse_depth(trimmed)?,
            ConfigKey::ResolverParallelProbe => {
                config.resolver.parallel_probe =
                    parse_bool(trimmed).ok_or_else(|| self.invalid(value, "expected a boolean"))?;
            }
            ConfigKey::LoggingLevel => {
                if trimmed.is_empty() {
                    return Err(self.invalid(value, "level cannot be empty"));
                }
                config.logging.level = trimmed.to_string();
            }
            ConfigKey::LoggingFile => config.logging.file = optional(trimmed),
        }
        Ok(())
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigError {
        ConfigError::invalid(self.section(), self.key_name(), value, reason)
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == s.trim())
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn optional_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}

fn optional(value: &str) -> Option<PathBuf> {
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}
