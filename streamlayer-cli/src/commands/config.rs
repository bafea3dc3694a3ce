//! Configuration management CLI commands.
//!
//! Provides `config get`, `config set`, `config list`, and `config path` for
//! the scalar settings. Path families and extra streams are edited in the file.

use std::path::Path;

use clap::Subcommand;
use streamlayer::config::{ConfigFile, ConfigKey};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., resolver.max_depth)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key in format section.key (e.g., resolver.max_depth)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration settings
    List,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand against the given file.
pub fn run(command: ConfigCommands, path: &Path) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => run_get(path, &key),
        ConfigCommands::Set { key, value } => run_set(path, &key, &value),
        ConfigCommands::List => run_list(path),
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'streamlayer config list' to see available keys.",
            key
        ))
    })
}

fn run_get(path: &Path, key: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;
    let value = config_key.get(&ConfigFile::load_or_default(path)?);

    if value.is_empty() {
        println!("(not set)");
    } else {
        println!("{}", value);
    }
    Ok(())
}

fn run_set(path: &Path, key: &str, value: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;

    let mut config = ConfigFile::load_or_default(path)?;
    config_key.set(&mut config, value)?;
    config.save_to(path)?;

    println!("Set {} = {}", config_key.name(), value);
    Ok(())
}

fn run_list(path: &Path) -> Result<(), CliError> {
    let config = ConfigFile::load_or_default(path)?;

    println!("Configuration Settings");
    println!("======================");
    println!();

    let mut current_section = "";
    for key in ConfigKey::all() {
        let section = key.section();
        if section != current_section {
            if !current_section.is_empty() {
                println!();
            }
            println!("[{}]", section);
            current_section = section;
        }

        let value = key.get(&config);
        if value.is_empty() {
            println!("  {} = (not set)", key.key_name());
        } else {
            println!("  {} = {}", key.key_name(), value);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_then_get_persists() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/config.ini");

        run(
            ConfigCommands::Set {
                key: "resolver.max_depth".into(),
                value: "8".into(),
            },
            &path,
        )
        .unwrap();

        assert_eq!(ConfigFile::load_or_default(&path).unwrap().resolver.max_depth, 8);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let temp = TempDir::new().unwrap();
        let err = run(
            ConfigCommands::Get {
                key: "resolver.nope".into(),
            },
            &temp.path().join("config.ini"),
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_invalid_value_not_saved() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        let result = run(
            ConfigCommands::Set {
                key: "resolver.max_depth".into(),
                value: "0".into(),
            },
            &path,
        );
        assert!(result.is_err());
        assert!(!path.exists());
    }
}
