//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api;
use crate::config::{ConfigOverrides, ServerConfig};
use sphynx_core::{Guid, OperationRegistry, OrderedDisk, SphynxError};
use std::path::{Path, PathBuf};

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the RPC server.
pub async fn cmd_server(
    config_file: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<(), SphynxError> {
    let config = ServerConfig::resolve(config_file, overrides)?;

    println!("Sphynx Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:           {}", config.host);
    println!("  Port:           {}", config.port);
    println!("  Ordered data:   {:?}", config.data_dir);
    println!("  Unordered data: {:?}", config.unordered_data_dir);
    println!(
        "  Persistence:    {} workers x {} jobs",
        config.persist_workers, config.persist_queue_capacity
    );
    println!();
    println!("Endpoints:");
    println!("  POST /can_compute                   - Is the operation registered?");
    println!("  POST /compute                       - Run an operation");
    println!("  POST /get_scalar                    - Read a scalar");
    println!("  POST /has_in_sphynx_memory          - Memory probe");
    println!("  POST /has_on_ordered_sphynx_disk    - Disk probe");
    println!("  POST /read_from_ordered_sphynx_disk - Load into memory");
    println!("  GET  /health                        - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(&config).await
}

// =============================================================================
// OPERATIONS COMMAND
// =============================================================================

/// List the operations the server would register.
pub fn cmd_operations(config_file: Option<&Path>, json_mode: bool) -> Result<(), SphynxError> {
    let config = ServerConfig::resolve(config_file, &ConfigOverrides::default())?;
    let registry = OperationRegistry::standard(&config.operations())?;
    let names: Vec<&str> = registry.names().collect();

    if json_mode {
        let output = serde_json::json!({
            "operations": names,
            "node2vec_command": config.node2vec_command,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Registered Operations");
    println!("=====================");
    for name in names {
        println!("  {}", name);
    }
    Ok(())
}

// =============================================================================
// INSPECT COMMAND
// =============================================================================

/// Decode one entity from the ordered disk area and describe it.
///
/// With `--verbose` the whole entity is printed as JSON.
pub fn cmd_inspect(
    config_file: Option<&Path>,
    data_dir: Option<PathBuf>,
    guid: &Guid,
    json_mode: bool,
    verbose: bool,
) -> Result<(), SphynxError> {
    let config = ServerConfig::resolve(
        config_file,
        &ConfigOverrides {
            data_dir,
            ..ConfigOverrides::default()
        },
    )?;
    let disk = OrderedDisk::open(&config.data_dir)?;
    let entity = disk.load(guid, None)?;

    if json_mode {
        let mut output = serde_json::json!({
            "guid": guid,
            "kind": entity.kind().to_string(),
            "len": entity.len(),
        });
        if verbose {
            output["entity"] = serde_json::to_value(&entity)
                .map_err(|e| SphynxError::Serialization(e.to_string()))?;
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Entity {}", guid);
    println!("======{}", "=".repeat(guid.as_str().chars().count() + 1));
    println!("Kind:     {}", entity.kind());
    println!("Elements: {}", entity.len());
    println!("Path:     {:?}", disk.entity_dir(guid)?);
    if verbose {
        println!();
        println!(
            "{}",
            serde_json::to_string_pretty(&entity).unwrap_or_default()
        );
    }
    Ok(())
}
