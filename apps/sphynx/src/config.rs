//! # Server Configuration
//!
//! Settings are layered, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. Optional TOML file (`--config`)
//! 3. Environment: `SPHYNX_DATA_DIR`, `UNORDERED_SPHYNX_DATA_DIR`,
//!    `SPHYNX_HOST`, `SPHYNX_PORT`
//! 4. Command-line flags
//!
//! Everything is read once at startup.

use serde::{Deserialize, Serialize};
use sphynx_core::{OperationsConfig, SphynxError};
use std::path::{Path, PathBuf};

pub const ENV_DATA_DIR: &str = "SPHYNX_DATA_DIR";
pub const ENV_UNORDERED_DATA_DIR: &str = "UNORDERED_SPHYNX_DATA_DIR";
pub const ENV_HOST: &str = "SPHYNX_HOST";
pub const ENV_PORT: &str = "SPHYNX_PORT";

/// Maximum accepted config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Complete server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Root of the ordered disk area.
    pub data_dir: PathBuf,
    /// Root of the unordered staging area.
    pub unordered_data_dir: PathBuf,
    pub host: String,
    pub port: u16,
    /// Number of background persistence workers.
    pub persist_workers: usize,
    /// Capacity of each worker's queue.
    pub persist_queue_capacity: usize,
    /// Argument-vector prefix of the embedding helper.
    pub node2vec_command: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("sphynx-data/ordered"),
            unordered_data_dir: PathBuf::from("sphynx-data/unordered"),
            host: "127.0.0.1".to_string(),
            port: 8080,
            persist_workers: 2,
            persist_queue_capacity: 1024,
            node2vec_command: OperationsConfig::default().node2vec_command,
        }
    }
}

/// Values given on the command line; `None` keeps the lower layer.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub data_dir: Option<PathBuf>,
    pub unordered_data_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Build the effective configuration from every layer.
    pub fn resolve(file: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self, SphynxError> {
        let mut config = match file {
            Some(path) => Self::load_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, SphynxError> {
        toml::from_str(text)
            .map_err(|e| SphynxError::Serialization(format!("Invalid config file: {}", e)))
    }

    pub fn load_file(path: &Path) -> Result<Self, SphynxError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            SphynxError::Io(format!("Cannot read config {}: {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(SphynxError::Io(format!(
                "Config file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }
        let text = std::fs::read_to_string(path).map_err(|e| {
            SphynxError::Io(format!("Cannot read config {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Apply the process environment. Empty variables are ignored.
    pub fn apply_env(&mut self) -> Result<(), SphynxError> {
        self.apply_env_with(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
    }

    /// Apply environment-style overrides from `lookup`.
    pub fn apply_env_with(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), SphynxError> {
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_UNORDERED_DATA_DIR) {
            self.unordered_data_dir = PathBuf::from(dir);
        }
        if let Some(host) = lookup(ENV_HOST) {
            self.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.port = port.parse().map_err(|_| SphynxError::InvalidParameter {
                name: ENV_PORT.to_string(),
                reason: format!("`{}` is not a port number", port),
            })?;
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(host) = &overrides.host {
            self.host.clone_from(host);
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(dir) = &overrides.data_dir {
            self.data_dir.clone_from(dir);
        }
        if let Some(dir) = &overrides.unordered_data_dir {
            self.unordered_data_dir.clone_from(dir);
        }
    }

    pub fn validate(&self) -> Result<(), SphynxError> {
        if self.persist_workers == 0 {
            return Err(SphynxError::InvalidParameter {
                name: "persist_workers".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.persist_queue_capacity == 0 {
            return Err(SphynxError::InvalidParameter {
                name: "persist_queue_capacity".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Socket address string for the listener.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Settings handed to the built-in operations.
    #[must_use]
    pub fn operations(&self) -> OperationsConfig {
        OperationsConfig {
            node2vec_command: self.node2vec_command.clone(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
