//! Prefix specifications and the virtual reference grammar.
//!
//! A virtual reference has the form `namespace://relative/path`. Strings
//! without the `://` delimiter are literal filesystem paths and pass through
//! resolution unchanged.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::error::{StreamError, StreamResult};

/// Delimiter between the namespace and the relative path.
pub const SCHEME_DELIMITER: &str = "://";

/// Access class of a namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessClass {
    /// Writable namespace backed by exactly one physical root.
    Writable,
    /// Read-only namespace, possibly layered over several roots.
    ReadOnly,
}

impl AccessClass {
    /// Check if this is the writable class.
    pub fn is_writable(&self) -> bool {
        matches!(self, AccessClass::Writable)
    }

    /// Parse from a config string (`writable` or `readonly`).
    pub fn from_config_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "writable" | "stream" => Some(AccessClass::Writable),
            "readonly" | "read-only" | "readonlystream" => Some(AccessClass::ReadOnly),
            _ => None,
        }
    }
}

impl fmt::Display for AccessClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessClass::Writable => write!(f, "writable"),
            AccessClass::ReadOnly => write!(f, "readonly"),
        }
    }
}

/// One search location in a prefix chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PrefixEntry {
    /// A physical directory.
    Literal { path: PathBuf },
    /// A location inside another namespace.
    Reference { namespace: String, path: String },
}

impl PrefixEntry {
    /// Create a literal entry.
    pub fn literal(path: impl Into<PathBuf>) -> Self {
        PrefixEntry::Literal { path: path.into() }
    }

    /// Create a reference entry.
    ///
    /// The relative path is normalized; a `..` segment is rejected.
    pub fn reference(namespace: impl Into<String>, path: &str) -> StreamResult<Self> {
        Ok(PrefixEntry::Reference {
            namespace: namespace.into(),
            path: normalize_relative(path)?,
        })
    }

    /// Parse a prefix specification as written in configuration.
    ///
    /// ```
    /// use streamlayer::stream::PrefixEntry;
    ///
    /// let entry = PrefixEntry::parse("gantry-theme://layouts").unwrap();
    /// assert_eq!(entry, PrefixEntry::reference("gantry-theme", "layouts").unwrap());
    ///
    /// let entry = PrefixEntry::parse("/srv/www/templates").unwrap();
    /// assert_eq!(entry, PrefixEntry::literal("/srv/www/templates"));
    /// ```
    pub fn parse(spec: &str) -> StreamResult<Self> {
        match VirtualReference::parse(spec)? {
            VirtualReference::Literal(path) => Ok(PrefixEntry::Literal { path }),
            VirtualReference::Stream { namespace, path } => {
                Ok(PrefixEntry::Reference { namespace, path })
            }
        }
    }

    /// Check if this entry points at another namespace.
    pub fn is_reference(&self) -> bool {
        matches!(self, PrefixEntry::Reference { .. })
    }
}

impl fmt::Display for PrefixEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefixEntry::Literal { path } => write!(f, "{}", path.display()),
            PrefixEntry::Reference { namespace, path } => {
                write!(f, "{}{}{}", namespace, SCHEME_DELIMITER, path)
            }
        }
    }
}

/// A parsed virtual reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VirtualReference {
    /// Bare physical path.
    Literal(PathBuf),
    /// `namespace://path`, with the path normalized.
    Stream { namespace: String, path: String },
}

impl VirtualReference {
    /// Parse a reference string.
    ///
    /// Only the first `://` splits namespace from path.
    pub fn parse(input: &str) -> StreamResult<Self> {
        match input.split_once(SCHEME_DELIMITER) {
            None => Ok(VirtualReference::Literal(PathBuf::from(input))),
            Some((namespace, path)) => Ok(VirtualReference::Stream {
                namespace: namespace.to_string(),
                path: normalize_relative(path)?,
            }),
        }
    }

    /// Namespace name, if this is a stream reference.
    pub fn namespace(&self) -> Option<&str> {
        match self {
            VirtualReference::Literal(_) => None,
            VirtualReference::Stream { namespace, .. } => Some(namespace),
        }
    }
}

impl fmt::Display for VirtualReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VirtualReference::Literal(path) => write!(f, "{}", path.display()),
            VirtualReference::Stream { namespace, path } => {
                write!(f, "{}{}{}", namespace, SCHEME_DELIMITER, path)
            }
        }
    }
}

/// Normalize a relative path into `/`-joined segments.
///
/// Empty and `.` segments are dropped, so leading, trailing and doubled
/// slashes disappear. Any `..` segment fails with
/// [`StreamError::PathEscape`].
pub fn normalize_relative(path: &str) -> StreamResult<String> {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                return Err(StreamError::PathEscape {
                    path: path.to_string(),
                })
            }
            other => segments.push(other),
        }
    }
    Ok(segments.join("/"))
}

/// Join two normalized relative paths.
pub(crate) fn join_relative(base: &str, rest: &str) -> String {
    match (base.is_empty(), rest.is_empty()) {
        (true, _) => rest.to_string(),
        (false, true) => base.to_string(),
        (false, false) => format!("{}/{}", base, rest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_path_is_literal() {
        let parsed = VirtualReference::parse("/var/www/templates/a.yaml").unwrap();
        assert_eq!(
            parsed,
            VirtualReference::Literal(PathBuf::from("/var/www/templates/a.yaml"))
        );
        assert_eq!(parsed.namespace(), None);
    }

    #[test]
    fn test_parse_stream_reference() {
        let parsed = VirtualReference::parse("gantry-theme://layouts/default.yaml").unwrap();
        assert_eq!(
            parsed,
            VirtualReference::Stream {
                namespace: "gantry-theme".to_string(),
                path: "layouts/default.yaml".to_string(),
            }
        );
        assert_eq!(parsed.to_string(), "gantry-theme://layouts/default.yaml");
    }

    #[test]
    fn test_parse_empty_relative_path() {
        let parsed = VirtualReference::parse("gantry-particles://").unwrap();
        assert_eq!(
            parsed,
            VirtualReference::Stream {
                namespace: "gantry-particles".to_string(),
                path: String::new(),
            }
        );
    }

    #[test]
    fn test_parse_splits_on_first_delimiter() {
        let parsed = VirtualReference::parse("a://b://c").unwrap();
        assert_eq!(parsed.namespace(), Some("a"));
        assert_eq!(
            parsed,
            VirtualReference::Stream {
                namespace: "a".to_string(),
                path: "b:/c".to_string(),
            }
        );
    }

    #[test]
    fn test_normalize_relative() {
        assert_eq!(normalize_relative("").unwrap(), "");
        assert_eq!(normalize_relative("/").unwrap(), "");
        assert_eq!(normalize_relative("a//b/./c/").unwrap(), "a/b/c");
        assert_eq!(normalize_relative("./layouts").unwrap(), "layouts");
    }

    #[test]
    fn test_normalize_rejects_parent_segments() {
        assert!(matches!(
            normalize_relative("../etc/passwd"),
            Err(StreamError::PathEscape { .. })
        ));
        assert!(matches!(
            normalize_relative("a/../b"),
            Err(StreamError::PathEscape { .. })
        ));
    }

    #[test]
    fn test_dotted_names_are_not_parent_segments() {
        assert_eq!(normalize_relative("..hidden/x..").unwrap(), "..hidden/x..");
    }

    #[test]
    fn test_join_relative() {
        assert_eq!(join_relative("", ""), "");
        assert_eq!(join_relative("a", ""), "a");
        assert_eq!(join_relative("", "b"), "b");
        assert_eq!(join_relative("a", "b/c"), "a/b/c");
    }

    #[test]
    fn test_prefix_entry_display() {
        assert_eq!(
            PrefixEntry::reference("gantry-engine", "/particles/")
                .unwrap()
                .to_string(),
            "gantry-engine://particles"
        );
        assert_eq!(PrefixEntry::literal("/srv/cache").to_string(), "/srv/cache");
    }

    #[test]
    fn test_access_class_from_config_str() {
        assert_eq!(
            AccessClass::from_config_str("Writable"),
            Some(AccessClass::Writable)
        );
        assert_eq!(
            AccessClass::from_config_str("ReadOnlyStream"),
            Some(AccessClass::ReadOnly)
        );
        assert_eq!(AccessClass::from_config_str("sometimes"), None);
    }
}
