//! Expansion results.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// A physical path produced by expanding a virtual reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Physical location.
    pub path: PathBuf,

    /// Namespace whose literal prefix produced this path.
    ///
    /// Empty for bare literal references.
    pub namespace: String,

    /// Sub-path key of that namespace that was selected.
    pub sub_path: String,
}

impl Candidate {
    /// Create a candidate produced by a namespace.
    pub fn new(
        path: impl Into<PathBuf>,
        namespace: impl Into<String>,
        sub_path: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            namespace: namespace.into(),
            sub_path: sub_path.into(),
        }
    }

    /// Create a candidate for a bare literal reference.
    pub fn literal(path: impl Into<PathBuf>) -> Self {
        Self::new(path, "", "")
    }

    /// Get the physical path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if this came from a bare literal reference.
    pub fn is_literal(&self) -> bool {
        self.namespace.is_empty()
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_literal() {
            return write!(f, "{}", self.path.display());
        }
        if self.sub_path.is_empty() {
            write!(f, "{} [{}]", self.path.display(), self.namespace)
        } else {
            write!(
                f,
                "{} [{}:{}]",
                self.path.display(),
                self.namespace,
                self.sub_path
            )
        }
    }
}

/// Ordered candidate list for one virtual reference.
///
/// Order is declaration priority: earlier candidates shadow later ones.
/// Duplicates are kept, since the same physical root reached through
/// different namespaces is a legitimate overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionResult {
    reference: String,
    candidates: Vec<Candidate>,
}

impl ResolutionResult {
    /// Create a result for a reference.
    pub fn new(reference: impl Into<String>, candidates: Vec<Candidate>) -> Self {
        Self {
            reference: reference.into(),
            candidates,
        }
    }

    /// The reference that was expanded.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// All candidates in priority order.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Highest priority candidate.
    pub fn first(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    /// Iterate over candidates.
    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.candidates.iter()
    }

    /// Candidate paths in priority order.
    pub fn paths(&self) -> Vec<&Path> {
        self.candidates.iter().map(|c| c.path.as_path()).collect()
    }

    /// Consume into candidate paths.
    pub fn into_paths(self) -> Vec<PathBuf> {
        self.candidates.into_iter().map(|c| c.path).collect()
    }

    /// Candidate paths with duplicates removed, keeping first occurrences.
    pub fn unique_paths(&self) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        self.candidates
            .iter()
            .filter(|c| seen.insert(c.path.as_path()))
            .map(|c| c.path.clone())
            .collect()
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Check if expansion produced nothing.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl IntoIterator for ResolutionResult {
    type Item = Candidate;
    type IntoIter = std::vec::IntoIter<Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResolutionResult {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}
