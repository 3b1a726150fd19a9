//! # Sphynx CLI Module
//!
//! This module implements the CLI interface for the Sphynx server binary.
//!
//! ## Available Commands
//!
//! - `server` - Start the RPC server (default)
//! - `operations` - List the registered operations
//! - `inspect` - Decode one entity from the ordered disk area

mod commands;

use crate::config::ConfigOverrides;
use clap::{Parser, Subcommand};
use sphynx_core::{Guid, SphynxError};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Sphynx - in-memory graph computation server
///
/// Holds graph entities in memory, runs named operations over them and
/// persists results to a local disk tier.
#[derive(Parser, Debug)]
#[command(name = "sphynx")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the RPC server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Root of the ordered disk area
        #[arg(short = 'D', long)]
        data_dir: Option<PathBuf>,

        /// Root of the unordered staging area
        #[arg(short = 'U', long)]
        unordered_data_dir: Option<PathBuf>,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List the registered operations
    Operations {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Decode one entity from the ordered disk area
    Inspect {
        /// GUID of the entity
        guid: String,

        /// Root of the ordered disk area
        #[arg(short = 'D', long)]
        data_dir: Option<PathBuf>,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), SphynxError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server {
            host,
            port,
            data_dir,
            unordered_data_dir,
            config,
        }) => {
            let overrides = ConfigOverrides {
                host,
                port,
                data_dir,
                unordered_data_dir,
            };
            cmd_server(config.as_deref(), &overrides).await
        }
        Some(Commands::Operations { config }) => cmd_operations(config.as_deref(), json_mode),
        Some(Commands::Inspect {
            guid,
            data_dir,
            config,
        }) => cmd_inspect(
            config.as_deref(),
            data_dir,
            &Guid::new(guid),
            json_mode,
            cli.verbose,
        ),
        None => {
            // No subcommand - start the server with defaults
            cmd_server(None, &ConfigOverrides::default()).await
        }
    }
}
