//! Overlay resolution over a shared registry.

use std::path::PathBuf;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, trace};

use super::candidate::{Candidate, ResolutionResult};
use super::error::{StreamError, StreamResult};
use super::probe::{LocalFilesystem, PathProbe};
use super::prefix::VirtualReference;
use super::registry::StreamRegistry;

/// Resolves virtual references against a frozen registry.
///
/// The resolver holds no mutable state and is cheap to clone; clones share
/// the registry and the probe.
///
/// # Example
///
/// ```ignore
/// use streamlayer::stream::StreamResolver;
///
/// let resolver = StreamResolver::new(registry.into_shared());
/// let layout = resolver.resolve("gantry-layouts://default.yaml")?;
/// let overlays = resolver.list("gantry-particles://menu.yaml")?;
/// ```
#[derive(Clone)]
pub struct StreamResolver {
    registry: Arc<StreamRegistry>,
    probe: Arc<dyn PathProbe>,
    parallel_probe: bool,
}

impl std::fmt::Debug for StreamResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamResolver")
            .field("namespaces", &self.registry.len())
            .field("parallel_probe", &self.parallel_probe)
            .finish()
    }
}

impl StreamResolver {
    /// Create a resolver probing the local filesystem.
    pub fn new(registry: Arc<StreamRegistry>) -> Self {
        Self {
            registry,
            probe: Arc::new(LocalFilesystem),
            parallel_probe: false,
        }
    }

    /// Use a different existence probe.
    pub fn with_probe(mut self, probe: impl PathProbe + 'static) -> Self {
        self.probe = Arc::new(probe);
        self
    }

    /// Check candidate existence in parallel.
    ///
    /// Results keep declaration order either way.
    pub fn with_parallel_probe(mut self, enabled: bool) -> Self {
        self.parallel_probe = enabled;
        self
    }

    /// The registry this resolver reads.
    pub fn registry(&self) -> &StreamRegistry {
        &self.registry
    }

    /// Expand a reference into every candidate, in priority order.
    pub fn expand(&self, reference: &str) -> StreamResult<ResolutionResult> {
        let result = self.registry.expand(reference)?;
        debug!(
            reference = reference,
            candidates = result.len(),
            "Expanded virtual reference"
        );
        Ok(result)
    }

    /// Resolve to the first candidate that exists.
    pub fn resolve(&self, reference: &str) -> StreamResult<PathBuf> {
        let result = self.expand(reference)?;
        let found = if self.parallel_probe {
            result
                .candidates()
                .par_iter()
                .find_first(|c| self.probe.exists(&c.path))
        } else {
            result.iter().find(|c| self.probe.exists(&c.path))
        };

        match found {
            Some(candidate) => {
                trace!(reference = reference, path = %candidate.path.display(), "Resolved");
                Ok(candidate.path.clone())
            }
            None => Err(StreamError::NotFound {
                reference: reference.to_string(),
                candidates: result.len(),
            }),
        }
    }

    /// Resolve a location to write to.
    ///
    /// The namespace must be writable. No existence check is made; callers
    /// create the path when it is missing. An expansion that fans out to more
    /// than one distinct path fails instead of picking one.
    pub fn resolve_for_write(&self, reference: &str) -> StreamResult<PathBuf> {
        let namespace = match VirtualReference::parse(reference)? {
            VirtualReference::Stream { namespace, .. } => namespace,
            VirtualReference::Literal(_) => {
                return Err(StreamError::NotWritable {
                    reference: reference.to_string(),
                })
            }
        };
        if !self.registry.lookup(&namespace)?.is_writable() {
            return Err(StreamError::NotWritable {
                reference: reference.to_string(),
            });
        }

        let mut paths = self.expand(reference)?.unique_paths();
        match paths.len() {
            0 => Err(StreamError::NotFound {
                reference: reference.to_string(),
                candidates: 0,
            }),
            1 => Ok(paths.remove(0)),
            roots => Err(StreamError::InvalidAccessConfig { namespace, roots }),
        }
    }

    /// Every existing candidate, in priority order.
    ///
    /// An empty list is a normal outcome, unlike [`resolve`](Self::resolve).
    pub fn list(&self, reference: &str) -> StreamResult<Vec<PathBuf>> {
        let existing = self.existing(self.expand(reference)?);
        if existing.is_empty() {
            debug!(reference = reference, "No existing candidates");
        }
        Ok(existing.into_iter().map(|c| c.path).collect())
    }

    /// Existing candidates with their origin, in priority order.
    pub fn list_candidates(&self, reference: &str) -> StreamResult<Vec<Candidate>> {
        Ok(self.existing(self.expand(reference)?))
    }

    /// Check whether any candidate exists.
    ///
    /// Resolution errors count as absence.
    pub fn exists(&self, reference: &str) -> bool {
        match self.resolve(reference) {
            Ok(_) => true,
            Err(StreamError::NotFound { .. }) => false,
            Err(e) => {
                debug!(reference = reference, error = %e, "Reference cannot exist");
                false
            }
        }
    }

    /// Resolve independent references in parallel.
    ///
    /// Results are returned in input order.
    pub fn find_all<S>(&self, references: &[S]) -> Vec<StreamResult<PathBuf>>
    where
        S: AsRef<str> + Sync,
    {
        references
            .par_iter()
            .map(|r| self.resolve(r.as_ref()))
            .collect()
    }

    fn existing(&self, result: ResolutionResult) -> Vec<Candidate> {
        let probe = &self.probe;
        let existing: Vec<Candidate> = if self.parallel_probe {
            result
                .candidates()
                .par_iter()
                .filter(|c| probe.exists(&c.path))
                .cloned()
                .collect()
        } else {
            result
                .into_iter()
                .filter(|c| probe.exists(&c.path))
                .collect()
        };
        if existing.is_empty() {
            trace!("Expansion produced no existing paths");
        }
        existing
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::path::Path;

    use super::*;
    use crate::stream::{AccessClass, PrefixEntry, PrefixMap};

    fn lit(p: &str) -> PrefixEntry {
        PrefixEntry::literal(p)
    }

    fn reference(spec: &str) -> PrefixEntry {
        PrefixEntry::parse(spec).unwrap()
    }

    /// Probe that reports a fixed set of paths as present.
    fn present(paths: &[&str]) -> impl PathProbe {
        let set: HashSet<PathBuf> = paths.iter().map(PathBuf::from).collect();
        move |path: &Path| set.contains(path)
    }

    /// A -> /p1, B -> A://sub, C particles -> [B://particles, A://particles].
    fn layered_registry() -> StreamRegistry {
        let mut registry = StreamRegistry::new();
        registry
            .register("A", AccessClass::ReadOnly, PrefixMap::root(vec![lit("/p1")]))
            .unwrap();
        registry
            .register(
                "B",
                AccessClass::ReadOnly,
                PrefixMap::root(vec![reference("A://sub")]),
            )
            .unwrap();
        registry
            .register(
                "C",
                AccessClass::ReadOnly,
                PrefixMap::new().with(
                    "particles",
                    vec![reference("B://particles"), reference("A://particles")],
                ),
            )
            .unwrap();
        registry
    }

    fn paths(result: &ResolutionResult) -> Vec<PathBuf> {
        result.iter().map(|c| c.path.clone()).collect()
    }

    #[test]
    fn test_expand_bare_literal_passes_through() {
        let resolver = StreamResolver::new(layered_registry().into_shared());
        let result = resolver.expand("/var/www/file.yaml").unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.candidates()[0], Candidate::literal("/var/www/file.yaml"));
    }

    #[test]
    fn test_expand_follows_reference() {
        let resolver = StreamResolver::new(layered_registry().into_shared());
        let result = resolver.expand("B://x").unwrap();
        assert_eq!(paths(&result), vec![PathBuf::from("/p1/sub/x")]);
        assert_eq!(result.candidates()[0].namespace, "A");
    }

    #[test]
    fn test_expand_keeps_declaration_order() {
        let resolver = StreamResolver::new(layered_registry().into_shared());
        let result = resolver.expand("C://particles/foo.yaml").unwrap();
        assert_eq!(
            paths(&result),
            vec![
                PathBuf::from("/p1/sub/particles/foo.yaml"),
                PathBuf::from("/p1/particles/foo.yaml"),
            ]
        );
    }

    #[test]
    fn test_expand_empty_relative_is_root() {
        let resolver = StreamResolver::new(layered_registry().into_shared());
        assert_eq!(
            paths(&resolver.expand("A://").unwrap()),
            vec![PathBuf::from("/p1")]
        );
    }

    #[test]
    fn test_expand_unknown_namespace() {
        let resolver = StreamResolver::new(layered_registry().into_shared());
        assert!(matches!(
            resolver.expand("Z://x"),
            Err(StreamError::UnknownNamespace(name)) if name == "Z"
        ));
    }

    #[test]
    fn test_expand_no_matching_sub_path() {
        let resolver = StreamResolver::new(layered_registry().into_shared());
        assert!(matches!(
            resolver.expand("C://layouts/x"),
            Err(StreamError::NoMatchingSubPath { namespace, .. }) if namespace == "C"
        ));
    }

    #[test]
    fn test_expand_self_reference_is_cyclic() {
        let mut registry = StreamRegistry::new().with_max_depth(8);
        registry
            .register(
                "loop",
                AccessClass::ReadOnly,
                PrefixMap::root(vec![reference("loop://deeper")]),
            )
            .unwrap();
        let resolver = StreamResolver::new(registry.into_shared());

        match resolver.expand("loop://x") {
            Err(StreamError::CyclicReference { depth, chain }) => {
                assert_eq!(depth, 8);
                assert_eq!(chain.len(), 9);
                assert!(chain.iter().all(|n| n == "loop"));
            }
            other => panic!("expected cyclic reference, got {:?}", other),
        }
    }

    #[test]
    fn test_expand_mutual_reference_is_cyclic() {
        let mut registry = StreamRegistry::new();
        registry
            .register("a", AccessClass::ReadOnly, PrefixMap::root(vec![reference("b://")]))
            .unwrap();
        registry
            .register("b", AccessClass::ReadOnly, PrefixMap::root(vec![reference("a://")]))
            .unwrap();
        let resolver = StreamResolver::new(registry.into_shared());
        assert!(matches!(
            resolver.expand("a://file"),
            Err(StreamError::CyclicReference { .. })
        ));
    }

    #[test]
    fn test_expand_rejects_escape_for_every_namespace() {
        let mut registry = layered_registry();
        registry
            .register("cache", AccessClass::Writable, PrefixMap::root(vec![lit("/cache")]))
            .unwrap();
        let resolver = StreamResolver::new(registry.into_shared());

        for ns in ["A", "B", "C", "cache"] {
            let reference = format!("{}://particles/../../etc/passwd", ns);
            assert!(
                matches!(resolver.expand(&reference), Err(StreamError::PathEscape { .. })),
                "{} should reject parent segments",
                ns
            );
        }
        assert!(matches!(
            resolver.resolve_for_write("cache://../x"),
            Err(StreamError::PathEscape { .. })
        ));
    }

    #[test]
    fn test_expand_keeps_duplicates() {
        let mut registry = StreamRegistry::new();
        registry
            .register("a", AccessClass::ReadOnly, PrefixMap::root(vec![lit("/same")]))
            .unwrap();
        registry
            .register(
                "b",
                AccessClass::ReadOnly,
                PrefixMap::root(vec![reference("a://"), lit("/same")]),
            )
            .unwrap();
        let result = registry.expand("b://f").unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.unique_paths(), vec![PathBuf::from("/same/f")]);
    }

    #[test]
    fn test_resolve_prefers_first_existing() {
        let resolver = StreamResolver::new(layered_registry().into_shared()).with_probe(present(&[
            "/p1/sub/particles/foo.yaml",
            "/p1/particles/foo.yaml",
        ]));
        assert_eq!(
            resolver.resolve("C://particles/foo.yaml").unwrap(),
            PathBuf::from("/p1/sub/particles/foo.yaml")
        );
    }

    #[test]
    fn test_resolve_falls_back_to_second_candidate() {
        for parallel in [false, true] {
            let resolver = StreamResolver::new(layered_registry().into_shared())
                .with_probe(present(&["/p1/particles/foo.yaml"]))
                .with_parallel_probe(parallel);
            assert_eq!(
                resolver.resolve("C://particles/foo.yaml").unwrap(),
                PathBuf::from("/p1/particles/foo.yaml")
            );
        }
    }

    #[test]
    fn test_resolve_not_found() {
        let resolver =
            StreamResolver::new(layered_registry().into_shared()).with_probe(present(&[]));
        assert!(matches!(
            resolver.resolve("C://particles/foo.yaml"),
            Err(StreamError::NotFound { candidates: 2, .. })
        ));
        assert!(!resolver.exists("C://particles/foo.yaml"));
        assert!(!resolver.exists("Z://nothing"));
    }

    #[test]
    fn test_list_returns_every_existing_layer() {
        let probe_paths = ["/p1/sub/particles/foo.yaml", "/p1/particles/foo.yaml"];
        for parallel in [false, true] {
            let resolver = StreamResolver::new(layered_registry().into_shared())
                .with_probe(present(&probe_paths))
                .with_parallel_probe(parallel);
            assert_eq!(
                resolver.list("C://particles/foo.yaml").unwrap(),
                vec![
                    PathBuf::from("/p1/sub/particles/foo.yaml"),
                    PathBuf::from("/p1/particles/foo.yaml"),
                ]
            );
        }
    }

    #[test]
    fn test_list_empty_is_not_an_error() {
        let resolver =
            StreamResolver::new(layered_registry().into_shared()).with_probe(present(&[]));
        assert!(resolver.list("A://missing").unwrap().is_empty());
    }

    #[test]
    fn test_list_candidates_reports_origin() {
        let resolver = StreamResolver::new(layered_registry().into_shared())
            .with_probe(present(&["/p1/particles/foo.yaml"]));
        let found = resolver.list_candidates("C://particles/foo.yaml").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].namespace, "A");
        assert_eq!(found[0].sub_path, "");
    }

    #[test]
    fn test_resolve_for_write() {
        let mut registry = layered_registry();
        registry
            .register("cache", AccessClass::Writable, PrefixMap::root(vec![lit("/cache")]))
            .unwrap();
        let resolver = StreamResolver::new(registry.into_shared()).with_probe(present(&[]));

        assert_eq!(
            resolver.resolve_for_write("cache://compiled/css/a.css").unwrap(),
            PathBuf::from("/cache/compiled/css/a.css")
        );
        assert!(matches!(
            resolver.resolve_for_write("A://x"),
            Err(StreamError::NotWritable { .. })
        ));
        assert!(matches!(
            resolver.resolve_for_write("/tmp/raw"),
            Err(StreamError::NotWritable { .. })
        ));
        assert!(matches!(
            resolver.resolve_for_write("Z://x"),
            Err(StreamError::UnknownNamespace(_))
        ));
    }

    #[test]
    fn test_resolve_for_write_refuses_fan_out() {
        let mut registry = StreamRegistry::new();
        registry
            .register("store", AccessClass::ReadOnly, PrefixMap::root(vec![lit("/store")]))
            .unwrap();
        registry
            .register(
                "cache",
                AccessClass::Writable,
                PrefixMap::root(vec![reference("store://cache")]),
            )
            .unwrap();

        // Re-registering the target behind the writable namespace's back.
        registry.unregister("store").unwrap();
        registry
            .register(
                "store",
                AccessClass::ReadOnly,
                PrefixMap::root(vec![lit("/one"), lit("/two")]),
            )
            .unwrap();
        assert!(matches!(
            registry.validate(),
            Err(StreamError::InvalidAccessConfig { roots: 2, .. })
        ));

        let resolver = StreamResolver::new(registry.into_shared());
        assert!(matches!(
            resolver.resolve_for_write("cache://a.css"),
            Err(StreamError::InvalidAccessConfig { roots: 2, .. })
        ));
    }

    #[test]
    fn test_expand_rejects_escape_in_reference_entry() {
        let mut registry = StreamRegistry::new();
        registry
            .register("theme", AccessClass::ReadOnly, PrefixMap::root(vec![lit("/srv/theme")]))
            .unwrap();
        registry
            .register(
                "up",
                AccessClass::ReadOnly,
                PrefixMap::root(vec![PrefixEntry::Reference {
                    namespace: "theme".to_string(),
                    path: "../..".to_string(),
                }]),
            )
            .unwrap();

        assert!(matches!(
            registry.validate(),
            Err(StreamError::PathEscape { .. })
        ));
        let resolver = StreamResolver::new(registry.into_shared());
        assert!(matches!(
            resolver.expand("up://etc/passwd"),
            Err(StreamError::PathEscape { .. })
        ));
    }

    #[test]
    fn test_find_all_keeps_input_order() {
        let resolver = StreamResolver::new(layered_registry().into_shared())
            .with_probe(present(&["/p1/a", "/p1/sub/b"]));
        let results = resolver.find_all(&["A://a", "B://b", "A://missing"][..]);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap(), &PathBuf::from("/p1/a"));
        assert_eq!(results[1].as_ref().unwrap(), &PathBuf::from("/p1/sub/b"));
        assert!(results[2].is_err());
    }

    #[test]
    fn test_resolver_is_shareable_across_threads() {
        let resolver = StreamResolver::new(layered_registry().into_shared())
            .with_probe(present(&["/p1/sub/x"]));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let resolver = resolver.clone();
                std::thread::spawn(move || resolver.resolve("B://x").unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), PathBuf::from("/p1/sub/x"));
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_bare_paths_pass_through(path in "[a-zA-Z0-9_./ -]{0,40}") {
                let resolver = StreamResolver::new(layered_registry().into_shared());
                let result = resolver.expand(&path)?;
                prop_assert_eq!(result.len(), 1);
                prop_assert_eq!(&result.candidates()[0].path, &PathBuf::from(&path));
            }

            #[test]
            fn test_parent_segment_always_escapes(
                ns in prop::sample::select(vec!["A", "B", "C"]),
                before in "[a-z]{1,8}(/[a-z]{1,8}){0,3}",
                after in "[a-z]{0,8}",
            ) {
                let resolver = StreamResolver::new(layered_registry().into_shared());
                let reference = format!("{}://{}/../{}", ns, before, after);
                let escaped = matches!(
                    resolver.expand(&reference),
                    Err(StreamError::PathEscape { .. })
                );
                prop_assert!(escaped, "{} was not rejected", reference);
            }
        }
    }
}
