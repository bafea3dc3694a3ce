//! Recursive expansion of virtual references into candidate paths.

use std::path::PathBuf;

use tracing::trace;

use super::candidate::{Candidate, ResolutionResult};
use super::error::{StreamError, StreamResult};
use super::namespace::SubPath;
use super::prefix::{join_relative, normalize_relative, PrefixEntry, VirtualReference};
use super::registry::StreamRegistry;

/// Walks prefix chains of a registry, following namespace references.
///
/// Holds the current reference chain so that runaway recursion can be
/// reported with the namespaces involved.
pub(crate) struct Expander<'a> {
    registry: &'a StreamRegistry,
    chain: Vec<String>,
    out: Vec<Candidate>,
    reachable: bool,
    lenient: bool,
}

impl<'a> Expander<'a> {
    pub(crate) fn new(registry: &'a StreamRegistry) -> Self {
        Self {
            registry,
            chain: Vec::new(),
            out: Vec::new(),
            reachable: false,
            lenient: false,
        }
    }

    /// Follow every sub-path key a reference could select, not only the one
    /// selected by the path at hand.
    ///
    /// With `t: "" -> [/a], x -> [/b]`, expanding `t://` yields `/a` and `/b`.
    pub(crate) fn reachable(mut self) -> Self {
        self.reachable = true;
        self
    }

    /// Skip reference entries whose target has no matching sub-path and keep
    /// going with the remaining entries.
    pub(crate) fn lenient(mut self) -> Self {
        self.lenient = true;
        self
    }

    /// Expand a reference string.
    pub(crate) fn expand(mut self, reference: &str) -> StreamResult<ResolutionResult> {
        match VirtualReference::parse(reference)? {
            VirtualReference::Literal(path) => Ok(ResolutionResult::new(
                reference,
                vec![Candidate::literal(path)],
            )),
            VirtualReference::Stream { namespace, path } => {
                self.expand_stream(&namespace, &path)?;
                Ok(ResolutionResult::new(reference, self.out))
            }
        }
    }

    /// Expand a chain that is not (yet) registered under `owner`.
    ///
    /// Used to check a namespace before it is admitted to the registry.
    pub(crate) fn expand_chain(
        mut self,
        owner: &str,
        sub_path: &str,
        entries: &[PrefixEntry],
    ) -> StreamResult<Vec<Candidate>> {
        self.chain.push(owner.to_string());
        self.expand_entries(owner, sub_path, entries, "")?;
        Ok(self.out)
    }

    fn expand_stream(&mut self, namespace: &str, relative: &str) -> StreamResult<()> {
        if self.chain.len() >= self.registry.max_depth() {
            let mut chain = std::mem::take(&mut self.chain);
            chain.push(namespace.to_string());
            return Err(StreamError::CyclicReference {
                depth: self.registry.max_depth(),
                chain,
            });
        }

        let registry = self.registry;
        let ns = registry.lookup(namespace)?;
        let selected = ns.prefixes.select(relative);

        // Keys below `relative` are selected by longer references.
        let deeper: Vec<&SubPath> = if self.reachable {
            ns.prefixes
                .sub_paths()
                .iter()
                .filter(|s| extends(&s.key, relative))
                .collect()
        } else {
            Vec::new()
        };

        if selected.is_none() && deeper.is_empty() {
            return Err(StreamError::NoMatchingSubPath {
                namespace: namespace.to_string(),
                path: relative.to_string(),
            });
        }

        self.chain.push(namespace.to_string());
        if let Some(sub_path) = selected {
            let stripped = sub_path.strip(relative);
            self.expand_entries(namespace, &sub_path.key, &sub_path.entries, stripped)?;
        }
        for sub_path in deeper {
            self.expand_entries(namespace, &sub_path.key, &sub_path.entries, "")?;
        }
        self.chain.pop();
        Ok(())
    }

    fn expand_entries(
        &mut self,
        namespace: &str,
        sub_path: &str,
        entries: &[PrefixEntry],
        stripped: &str,
    ) -> StreamResult<()> {
        for entry in entries {
            match entry {
                PrefixEntry::Literal { path } => {
                    let candidate = self.literal_path(path, stripped);
                    trace!(
                        namespace = namespace,
                        sub_path = sub_path,
                        path = %candidate.display(),
                        "Expanded literal prefix"
                    );
                    self.out.push(Candidate::new(candidate, namespace, sub_path));
                }
                PrefixEntry::Reference {
                    namespace: target,
                    path,
                } => {
                    let relative = normalize_relative(&join_relative(path, stripped))?;
                    match self.expand_stream(target, &relative) {
                        Err(StreamError::NoMatchingSubPath { namespace, path }) if self.lenient => {
                            trace!(
                                namespace = %namespace,
                                path = %path,
                                "Skipped reference without matching prefix"
                            );
                        }
                        other => other?,
                    }
                }
            }
        }
        Ok(())
    }

    fn literal_path(&self, root: &std::path::Path, stripped: &str) -> PathBuf {
        let root = match self.registry.base_dir() {
            Some(base) if root.is_relative() => base.join(root),
            _ => root.to_path_buf(),
        };
        if stripped.is_empty() {
            root
        } else {
            root.join(stripped)
        }
    }
}

/// Whether `key` lies strictly below `relative` by whole segments.
fn extends(key: &str, relative: &str) -> bool {
    if key.is_empty() || key == relative {
        return false;
    }
    relative.is_empty()
        || key
            .strip_prefix(relative)
            .is_some_and(|rest| rest.starts_with('/'))
}
