//! # Sphynx Client CLI
//!
//! Command-line prober for a running Sphynx server.
//!
//! Reads configuration from flags or environment variables:
//! - `SPHYNX_URL` — server URL (default: `http://localhost:8080`)
//! - `SPHYNX_API_KEY` — optional Bearer token for authentication

use clap::{Parser, Subcommand};
use serde_json::json;
use sphynx_client::{ClientError, SphynxClient};
use sphynx_core::Guid;
use std::path::{Path, PathBuf};

/// Maximum descriptor file size (2 MB), same as the server's body limit.
const MAX_DESCRIPTOR_FILE_SIZE: u64 = 2 * 1024 * 1024;

/// Sphynx client - probe and drive a Sphynx server
#[derive(Parser, Debug)]
#[command(name = "sphynx-client")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Server URL
    #[arg(long, env = "SPHYNX_URL", default_value = "http://localhost:8080")]
    url: String,

    /// API key sent as a Bearer token
    #[arg(long, env = "SPHYNX_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask whether the server knows the operation in a descriptor file
    CanCompute {
        /// Descriptor JSON file
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Run the operation in a descriptor file
    Compute {
        /// Descriptor JSON file
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Print a scalar's JSON value
    GetScalar { guid: String },
    /// Is the entity in memory?
    HasInMemory { guid: String },
    /// Is the entity on the ordered disk?
    HasOnDisk { guid: String },
    /// Load an entity from the ordered disk into memory
    ReadFromDisk { guid: String },
    /// Server health
    Health,
}

#[tokio::main]
async fn main() {
    // Logging to stderr only; stdout carries command results.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sphynx_client=warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let client = SphynxClient::new(&cli.url, cli.api_key);
    tracing::debug!("Target: {}", client.base_url());

    match run(&client, cli.command).await {
        Ok(output) => println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        ),
        Err(e) => {
            tracing::error!("Error: {}", e);
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

async fn run(client: &SphynxClient, command: Commands) -> Result<serde_json::Value, ClientError> {
    let output = match command {
        Commands::CanCompute { file } => {
            let descriptor = read_descriptor(&file)?;
            json!({ "can_compute": client.can_compute(&descriptor).await? })
        }
        Commands::Compute { file } => {
            let descriptor = read_descriptor(&file)?;
            client.compute(&descriptor).await?;
            json!({})
        }
        Commands::GetScalar { guid } => {
            json!({ "scalar": client.get_scalar(&Guid::new(guid)).await? })
        }
        Commands::HasInMemory { guid } => {
            json!({ "has_in_memory": client.has_in_memory(&Guid::new(guid)).await? })
        }
        Commands::HasOnDisk { guid } => {
            json!({ "has_on_disk": client.has_on_disk(&Guid::new(guid)).await? })
        }
        Commands::ReadFromDisk { guid } => {
            client.read_from_disk(&Guid::new(guid)).await?;
            json!({})
        }
        Commands::Health => client.health().await?,
    };
    Ok(output)
}

fn read_descriptor(path: &Path) -> Result<String, ClientError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| ClientError::ParseError(format!("Cannot read {}: {e}", path.display())))?;
    if metadata.len() > MAX_DESCRIPTOR_FILE_SIZE {
        return Err(ClientError::ParseError(format!(
            "Descriptor size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_DESCRIPTOR_FILE_SIZE
        )));
    }
    std::fs::read_to_string(path)
        .map_err(|e| ClientError::ParseError(format!("Cannot read {}: {e}", path.display())))
}
