//! Vertex embedding delegated to an external helper process.
//!
//! The helper is invoked as
//!
//! ```text
//! <command...> <vertexCount> <iterations> <dimensions> <esPath>
//! ```
//!
//! where `esPath` is the edge bundle staged as JSON in the unordered area.
//! It must print `{ "<outputName>": <entity JSON>, ... }` on stdout.
//! Anything on stderr is kept for diagnostics.

use crate::accessor::EntityAccessor;
use crate::registry::Operation;
use crate::SphynxError;
use std::process::Command;

/// Embedding size used when the descriptor does not set `dimensions`.
pub const DEFAULT_DIMENSIONS: f64 = 128.0;

#[derive(Debug, Clone)]
pub struct Node2Vec {
    command: Vec<String>,
}

impl Node2Vec {
    /// `command` is the argument-vector prefix, e.g. `["python", "node2vec.py"]`.
    #[must_use]
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    fn display_command(&self) -> String {
        self.command.join(" ")
    }
}

impl Operation for Node2Vec {
    fn execute(&self, ea: &mut EntityAccessor<'_>) -> Result<(), SphynxError> {
        let vertex_count = ea.get_vertex_set("vs")?.len();
        let iterations = ea.get_float_param("iterations")?;
        let dimensions = ea
            .get_optional_float_param("dimensions")?
            .unwrap_or(DEFAULT_DIMENSIONS);
        let es_path = ea.write_to_disk("es")?;

        let command = self.display_command();
        let failure = |status: String, stderr: String| SphynxError::ExternalProcessFailure {
            command: command.clone(),
            status,
            stderr,
        };

        let Some((program, prefix_args)) = self.command.split_first() else {
            return Err(failure("not configured".to_string(), String::new()));
        };

        tracing::info!("Running {} for {} vertices", command, vertex_count);
        let output = Command::new(program)
            .args(prefix_args)
            .arg(vertex_count.to_string())
            .arg(iterations.to_string())
            .arg(dimensions.to_string())
            .arg(&es_path)
            .output()
            .map_err(|e| failure("spawn failed".to_string(), e.to_string()))?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !stderr.is_empty() {
            tracing::debug!("{} stderr: {}", command, stderr.trim_end());
        }
        if !output.status.success() {
            return Err(failure(output.status.to_string(), stderr));
        }

        ea.output_from_json(&command, &output.stdout)
    }
}
