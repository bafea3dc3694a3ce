//! Namespace registry.
//!
//! The registry is mutated only while it is being built. After construction
//! it is shared (usually behind an `Arc`) and read concurrently without
//! locking.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use super::candidate::ResolutionResult;
use super::error::{StreamError, StreamResult};
use super::expand::Expander;
use super::namespace::{Namespace, Position, PrefixMap, SubPath};
use super::prefix::{AccessClass, PrefixEntry};

/// Default bound on nested namespace references.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Registry of stream namespaces.
///
/// # Example
///
/// ```
/// use streamlayer::stream::{AccessClass, PrefixEntry, PrefixMap, StreamRegistry};
///
/// let mut registry = StreamRegistry::new();
/// registry
///     .register(
///         "engine",
///         AccessClass::ReadOnly,
///         PrefixMap::root(vec![PrefixEntry::literal("/engine")]),
///     )
///     .unwrap();
/// registry
///     .register(
///         "particles",
///         AccessClass::ReadOnly,
///         PrefixMap::root(vec![PrefixEntry::parse("engine://particles").unwrap()]),
///     )
///     .unwrap();
///
/// let result = registry.expand("particles://menu.yaml").unwrap();
/// assert_eq!(result.paths(), vec![std::path::Path::new("/engine/particles/menu.yaml")]);
/// ```
#[derive(Debug, Clone)]
pub struct StreamRegistry {
    /// Namespaces in registration order.
    namespaces: Vec<Namespace>,

    /// Name to position in `namespaces`.
    index: HashMap<String, usize>,

    /// Base directory for relative literal prefixes.
    base_dir: Option<PathBuf>,

    /// Maximum reference nesting during expansion.
    max_depth: usize,
}

impl Default for StreamRegistry {
    fn default() -> Self {
        Self {
            namespaces: Vec::new(),
            index: HashMap::new(),
            base_dir: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl StreamRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base directory for relative literal prefixes.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    /// Set the maximum reference nesting (at least 1).
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Base directory, if configured.
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Maximum reference nesting.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Register a namespace.
    ///
    /// Fails if the name is taken, or if a writable namespace does not expand
    /// to exactly one physical root.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        access: AccessClass,
        prefixes: PrefixMap,
    ) -> StreamResult<()> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(StreamError::DuplicateNamespace(name));
        }

        let namespace = Namespace::new(name, access, prefixes);
        self.check_access(&namespace)?;

        debug!(
            namespace = %namespace.name,
            access = %namespace.access,
            sub_paths = namespace.prefixes.len(),
            "Registered stream"
        );
        self.index.insert(namespace.name.clone(), self.namespaces.len());
        self.namespaces.push(namespace);
        Ok(())
    }

    /// Add search locations to an already registered namespace.
    ///
    /// Every writable namespace is re-checked, since it may reach the
    /// extended one through a reference. On failure the namespace is left
    /// unchanged.
    pub fn add_prefixes(
        &mut self,
        name: &str,
        key: &str,
        entries: Vec<PrefixEntry>,
        position: Position,
    ) -> StreamResult<()> {
        let slot = *self
            .index
            .get(name)
            .ok_or_else(|| StreamError::UnknownNamespace(name.to_string()))?;
        let mut updated = self.namespaces[slot].clone();
        updated.prefixes.extend(key, entries, position);

        let previous = std::mem::replace(&mut self.namespaces[slot], updated);
        if let Err(e) = self.check_writable() {
            self.namespaces[slot] = previous;
            return Err(e);
        }

        debug!(namespace = name, key = key, "Extended stream prefixes");
        Ok(())
    }

    /// Remove a namespace, returning it.
    ///
    /// Namespaces referencing it are not checked; run [`validate`](Self::validate)
    /// after re-registering.
    pub fn unregister(&mut self, name: &str) -> StreamResult<Namespace> {
        let slot = self
            .index
            .remove(name)
            .ok_or_else(|| StreamError::UnknownNamespace(name.to_string()))?;
        let removed = self.namespaces.remove(slot);
        for position in self.index.values_mut() {
            if *position > slot {
                *position -= 1;
            }
        }
        Ok(removed)
    }

    /// Look up a namespace by name.
    pub fn lookup(&self, name: &str) -> StreamResult<&Namespace> {
        self.get(name)
            .ok_or_else(|| StreamError::UnknownNamespace(name.to_string()))
    }

    /// Get a namespace by name, if registered.
    pub fn get(&self, name: &str) -> Option<&Namespace> {
        self.index.get(name).map(|&slot| &self.namespaces[slot])
    }

    /// Check if a namespace is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Declared sub-path chains of a namespace, in declaration order.
    pub fn sub_paths(&self, name: &str) -> StreamResult<&[SubPath]> {
        Ok(self.lookup(name)?.prefixes.sub_paths())
    }

    /// Namespaces in registration order.
    pub fn namespaces(&self) -> impl Iterator<Item = &Namespace> {
        self.namespaces.iter()
    }

    /// Number of registered namespaces.
    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// Expand a virtual reference into its ordered candidates.
    ///
    /// No existence checks are made; see
    /// [`StreamResolver`](crate::stream::StreamResolver) for those.
    pub fn expand(&self, reference: &str) -> StreamResult<ResolutionResult> {
        Expander::new(self).expand(reference)
    }

    /// Expand every declared prefix entry once, then re-check every writable
    /// namespace.
    ///
    /// Fails on references to unknown namespaces, cycles, escaping reference
    /// paths and writable namespaces without exactly one root. A referenced
    /// namespace that has no chain for the requested sub-path is not an error
    /// here; the entry is skipped and the rest of the chain is still checked.
    pub fn validate(&self) -> StreamResult<()> {
        for namespace in &self.namespaces {
            for sub_path in namespace.prefixes.sub_paths() {
                for entry in &sub_path.entries {
                    Expander::new(self).lenient().expand_chain(
                        &namespace.name,
                        &sub_path.key,
                        std::slice::from_ref(entry),
                    )?;
                }
            }
        }
        self.check_writable()?;
        info!(namespaces = self.namespaces.len(), "Stream registry validated");
        Ok(())
    }

    /// Freeze the registry for sharing.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Distinct physical roots a namespace expands to.
    ///
    /// Referenced namespaces contribute the chains of every sub-path key a
    /// reference into them could select.
    pub fn roots(&self, namespace: &Namespace) -> StreamResult<Vec<PathBuf>> {
        let mut seen = HashSet::new();
        let mut roots = Vec::new();
        for sub_path in namespace.prefixes.sub_paths() {
            let candidates = Expander::new(self).reachable().expand_chain(
                &namespace.name,
                &sub_path.key,
                &sub_path.entries,
            )?;
            for candidate in candidates {
                if seen.insert(candidate.path.clone()) {
                    roots.push(candidate.path);
                }
            }
        }
        Ok(roots)
    }

    fn check_writable(&self) -> StreamResult<()> {
        self.namespaces
            .iter()
            .try_for_each(|namespace| self.check_access(namespace))
    }

    fn check_access(&self, namespace: &Namespace) -> StreamResult<()> {
        if !namespace.is_writable() {
            return Ok(());
        }
        let roots = self.roots(namespace)?;
        if roots.len() != 1 {
            return Err(StreamError::InvalidAccessConfig {
                namespace: namespace.name.clone(),
                roots: roots.len(),
            });
        }
        Ok(())
    }
}
