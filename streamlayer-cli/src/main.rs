//! StreamLayer CLI - Command-line interface
//!
//! Resolves `namespace://path` references against the stream registry built
//! from the configuration file.

mod commands;
mod error;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use streamlayer::config::{config_file_path, ConfigFile};
use streamlayer::logging::init_logging;
use tracing::debug;

use commands::config::ConfigCommands;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "streamlayer")]
#[command(version, about = "Layered virtual path resolver", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ~/.streamlayer/config.ini)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the first existing location of a reference
    Resolve {
        /// Virtual reference, e.g. gantry-theme://css/style.css
        reference: String,
    },

    /// Print every candidate location of a reference
    Expand {
        /// Virtual reference
        reference: String,

        /// Print candidates as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print every existing location of a reference, highest precedence first
    List {
        /// Virtual reference
        reference: String,
    },

    /// Print the location a reference would be written to
    WritePath {
        /// Virtual reference in a writable stream
        reference: String,
    },

    /// Check that references exist
    Exists {
        /// Virtual references
        #[arg(required = true)]
        references: Vec<String>,
    },

    /// Show registered streams
    Streams {
        /// Print streams as JSON
        #[arg(long)]
        json: bool,
    },

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.unwrap_or_else(config_file_path);

    if let Commands::Config { command } = cli.command {
        return commands::config::run(command, &config_path);
    }

    let config = ConfigFile::load_or_default(&config_path)?;
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    let _guard = init_logging(&logging)?;
    debug!(config = %config_path.display(), "Starting");

    let resolver = commands::build_resolver(config)?;

    match cli.command {
        Commands::Resolve { reference } => commands::resolve::run_resolve(&resolver, &reference),
        Commands::Expand { reference, json } => {
            commands::resolve::run_expand(&resolver, &reference, json)
        }
        Commands::List { reference } => commands::resolve::run_list(&resolver, &reference),
        Commands::WritePath { reference } => {
            commands::resolve::run_write_path(&resolver, &reference)
        }
        Commands::Exists { references } => commands::resolve::run_exists(&resolver, &references),
        Commands::Streams { json } => commands::streams::run(&resolver, json),
        Commands::Config { .. } => Ok(()),
    }
}
