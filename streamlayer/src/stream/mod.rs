//! Layered virtual path resolution ("streams").
//!
//! A stream namespace maps a symbolic name such as `gantry-theme` to an
//! ordered list of physical search locations. Locations may themselves be
//! expressed through other namespaces, so one namespace can layer several
//! others into a single overlay view.
//!
//! # Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                StreamRegistry                │
//! │                                              │
//! │  gantry-theme     ""  → [/site/templates/h]  │
//! │  gantry-engine    ""  → [/site/engines/n]    │
//! │  gantry-particles ""  → [gantry-theme://particles,
//! │                          gantry-engine://particles]
//! └──────────────────────┬───────────────────────┘
//!                        │ Arc (read-only)
//!                        ▼
//! ┌──────────────────────────────────────────────┐
//! │                StreamResolver                │
//! │                                              │
//! │  expand  → every candidate, priority order   │
//! │  resolve → first candidate that exists       │
//! │  list    → every candidate that exists       │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Precedence Rules
//!
//! 1. Within a namespace, the most specific sub-path key wins; the root key
//!    (`""`) is the fallback.
//! 2. Entries of the selected chain are tried in declaration order. A
//!    reference entry splices the referenced namespace's candidates in place.
//! 3. First existing candidate wins on [`StreamResolver::resolve`].
//!
//! # Example
//!
//! ```
//! use streamlayer::stream::{AccessClass, PrefixEntry, PrefixMap, StreamRegistry, StreamResolver};
//!
//! let mut registry = StreamRegistry::new();
//! registry.register(
//!     "gantry-theme",
//!     AccessClass::ReadOnly,
//!     PrefixMap::root(vec![PrefixEntry::literal("/site/templates/hydrogen")]),
//! )?;
//! registry.register(
//!     "gantry-layouts",
//!     AccessClass::ReadOnly,
//!     PrefixMap::root(vec![PrefixEntry::parse("gantry-theme://layouts")?]),
//! )?;
//!
//! let resolver = StreamResolver::new(registry.into_shared());
//! let result = resolver.expand("gantry-layouts://default.yaml")?;
//! assert_eq!(
//!     result.paths(),
//!     vec![std::path::Path::new("/site/templates/hydrogen/layouts/default.yaml")]
//! );
//! # Ok::<(), streamlayer::stream::StreamError>(())
//! ```

mod candidate;
mod error;
mod expand;
mod namespace;
mod prefix;
mod probe;
mod registry;
mod resolver;

pub use candidate::{Candidate, ResolutionResult};
pub use error::{StreamError, StreamResult};
pub use namespace::{Namespace, Position, PrefixMap, SubPath};
pub use prefix::{normalize_relative, AccessClass, PrefixEntry, VirtualReference, SCHEME_DELIMITER};
pub use probe::{LocalFilesystem, PathProbe};
pub use registry::{StreamRegistry, DEFAULT_MAX_DEPTH};
pub use resolver::StreamResolver;
