//! StreamLayer - Layered virtual path resolution
//!
//! This library maps symbolic stream namespaces (`gantry-theme://`,
//! `gantry-particles://`, ...) onto ordered physical search locations and
//! resolves virtual references with first-match-wins overlay semantics.
//!
//! - [`stream`]: namespace registry, reference expansion and resolution
//! - [`platform`]: platform path providers and the built-in stream table
//! - [`config`]: INI configuration file
//! - [`logging`]: tracing subscriber bootstrap

pub mod config;
pub mod logging;
pub mod platform;
pub mod stream;

pub use platform::{build_registry, Platform};
pub use stream::{StreamError, StreamRegistry, StreamResolver, StreamResult};
