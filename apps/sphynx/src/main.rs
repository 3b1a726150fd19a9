//! # Sphynx - Graph Computation Server
//!
//! The main binary for the Sphynx engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      apps/sphynx (THE BINARY)                   │
//! │                                                                 │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐    │
//! │  │   CLI       │    │  RPC (HTTP) │    │ Persistence pool │    │
//! │  │  (clap)     │    │   (axum)    │    │  (tokio workers) │    │
//! │  └──────┬──────┘    └──────┬──────┘    └────────┬─────────┘    │
//! │         │                  │                    │              │
//! │         └──────────────────┼────────────────────┘              │
//! │                            ▼                                   │
//! │                    ┌───────────────┐                           │
//! │                    │  sphynx-core  │                           │
//! │                    │ (THE ENGINE)  │                           │
//! │                    └───────────────┘                           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the server
//! sphynx server --host 0.0.0.0 --port 8080 --data-dir /var/lib/sphynx/ordered
//!
//! # List registered operations
//! sphynx operations
//!
//! # Look at a persisted entity
//! sphynx inspect 6f1c-vertices --verbose
//! ```

use clap::Parser;
use sphynx::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // SPHYNX_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("SPHYNX_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sphynx=info,sphynx_core=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  ███████╗██████╗ ██╗  ██╗██╗   ██╗███╗   ██╗██╗  ██╗
  ██╔════╝██╔══██╗██║  ██║╚██╗ ██╔╝████╗  ██║╚██╗██╔╝
  ███████╗██████╔╝███████║ ╚████╔╝ ██╔██╗ ██║ ╚███╔╝
  ╚════██║██╔═══╝ ██╔══██║  ╚██╔╝  ██║╚██╗██║ ██╔██╗
  ███████║██║     ██║  ██║   ██║   ██║ ╚████║██╔╝ ██╗
  ╚══════╝╚═╝     ╚═╝  ╚═╝   ╚═╝   ╚═╝  ╚═══╝╚═╝  ╚═╝

  Graph Computation Server v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
