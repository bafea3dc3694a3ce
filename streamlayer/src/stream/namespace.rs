//! Namespace and prefix map types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::prefix::{AccessClass, PrefixEntry};

/// The chain declared for one sub-path key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubPath {
    /// Sub-path key, without leading or trailing slashes. Empty is the root.
    pub key: String,

    /// Search locations in priority order.
    pub entries: Vec<PrefixEntry>,
}

impl SubPath {
    /// Check whether this key covers a normalized relative path.
    ///
    /// The root key covers everything; other keys must match whole leading
    /// segments (`particles` covers `particles/menu.yaml`, not `particlesX`).
    pub fn matches(&self, relative: &str) -> bool {
        if self.key.is_empty() {
            return true;
        }
        match relative.strip_prefix(self.key.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Strip this key from a relative path it matches.
    pub fn strip<'a>(&self, relative: &'a str) -> &'a str {
        relative
            .strip_prefix(self.key.as_str())
            .unwrap_or(relative)
            .trim_start_matches('/')
    }
}

/// Where [`PrefixMap::extend`] places new entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Before existing entries (higher priority).
    Prepend,
    /// After existing entries (lower priority).
    Append,
}

/// Ordered mapping from sub-path key to prefix chain.
///
/// Declaration order is kept; it breaks ties between equally specific keys
/// and is the order reported back by the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixMap {
    sub_paths: Vec<SubPath>,
}

impl PrefixMap {
    /// Create an empty prefix map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a map with only a root chain.
    pub fn root(entries: Vec<PrefixEntry>) -> Self {
        Self::new().with("", entries)
    }

    /// Add a chain for a key (builder style).
    pub fn with(mut self, key: &str, entries: Vec<PrefixEntry>) -> Self {
        self.insert(key, entries);
        self
    }

    /// Add a chain for a key.
    ///
    /// Declaring a key twice appends to its existing chain.
    pub fn insert(&mut self, key: &str, entries: Vec<PrefixEntry>) {
        self.extend(key, entries, Position::Append);
    }

    /// Add entries to a key's chain at the given position.
    pub fn extend(&mut self, key: &str, entries: Vec<PrefixEntry>, position: Position) {
        let key = normalize_key(key);
        match self.sub_paths.iter_mut().find(|s| s.key == key) {
            Some(existing) => match position {
                Position::Append => existing.entries.extend(entries),
                Position::Prepend => {
                    let mut merged = entries;
                    merged.append(&mut existing.entries);
                    existing.entries = merged;
                }
            },
            None => self.sub_paths.push(SubPath { key, entries }),
        }
    }

    /// Get the chain declared for a key.
    pub fn get(&self, key: &str) -> Option<&[PrefixEntry]> {
        let key = normalize_key(key);
        self.sub_paths
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.entries.as_slice())
    }

    /// Select the sub-path for a normalized relative path.
    ///
    /// The longest matching key wins; among equal lengths the earliest
    /// declared wins. The root key is the fallback.
    pub fn select(&self, relative: &str) -> Option<&SubPath> {
        let mut best: Option<&SubPath> = None;
        for sub_path in self.sub_paths.iter().filter(|s| s.matches(relative)) {
            match best {
                Some(current) if current.key.len() >= sub_path.key.len() => {}
                _ => best = Some(sub_path),
            }
        }
        best
    }

    /// Declared sub-paths in declaration order.
    pub fn sub_paths(&self) -> &[SubPath] {
        &self.sub_paths
    }

    /// Iterate over all entries of all keys.
    pub fn entries(&self) -> impl Iterator<Item = &PrefixEntry> {
        self.sub_paths.iter().flat_map(|s| s.entries.iter())
    }

    /// Number of declared keys.
    pub fn len(&self) -> usize {
        self.sub_paths.len()
    }

    /// Check if no keys are declared.
    pub fn is_empty(&self) -> bool {
        self.sub_paths.is_empty()
    }
}

fn normalize_key(key: &str) -> String {
    key.trim_matches('/').to_string()
}

/// A registered namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    /// Unique name, used as the scheme in virtual references.
    pub name: String,

    /// Access class.
    pub access: AccessClass,

    /// Declared prefix chains.
    pub prefixes: PrefixMap,
}

impl Namespace {
    /// Create a new namespace.
    pub fn new(name: impl Into<String>, access: AccessClass, prefixes: PrefixMap) -> Self {
        Self {
            name: name.into(),
            access,
            prefixes,
        }
    }

    /// Check if the namespace is writable.
    pub fn is_writable(&self) -> bool {
        self.access.is_writable()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {} sub-path(s))",
            self.name,
            self.access,
            self.prefixes.len()
        )
    }
}
