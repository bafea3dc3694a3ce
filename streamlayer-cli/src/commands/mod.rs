//! CLI subcommands.

pub mod config;
pub mod resolve;
pub mod streams;

use streamlayer::config::ConfigFile;
use streamlayer::platform::{build_registry_with, ConfiguredPlatform};
use streamlayer::stream::StreamResolver;

use crate::error::CliError;

/// Build the registry described by the configuration and wrap it in a resolver.
pub fn build_resolver(config: ConfigFile) -> Result<StreamResolver, CliError> {
    let parallel_probe = config.resolver.parallel_probe;
    let platform = ConfiguredPlatform::new(config);
    let registry =
        build_registry_with(&platform, platform.empty_registry()).map_err(CliError::Registry)?;

    Ok(StreamResolver::new(registry.into_shared()).with_parallel_probe(parallel_probe))
}
