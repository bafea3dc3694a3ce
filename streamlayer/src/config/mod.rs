//! Configuration file support.
//!
//! Configuration lives in `~/.streamlayer/config.ini`:
//!
//! ```ini
//! [platform]
//! root = /srv/www/site
//! cache = cache/gantry5
//!
//! [resolver]
//! max_depth = 32
//! parallel_probe = false
//!
//! [logging]
//! level = info
//!
//! [paths.theme]
//! root = templates/hydrogen
//! particles = templates/hydrogen/custom/particles, templates/hydrogen/particles
//!
//! [stream.gantry-admin]
//! access = readonly
//! root = administrator/components/com_gantry5
//! ```
//!
//! In `paths.*` and `stream.*` sections the key `root` is the root sub-path;
//! any other key names a sub-path. Values are comma-separated prefixes in
//! priority order, either physical paths or `namespace://path` references.

mod error;
mod file;
mod keys;

pub use error::ConfigError;
pub use file::{
    config_directory, config_file_path, parse_prefixes, ConfigFile, LoggingSettings,
    PathSettings, PlatformSettings, ResolverSettings, StreamSettings, PATH_FAMILIES, ROOT_KEY,
};
pub use keys::ConfigKey;
