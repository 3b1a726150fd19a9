//! # Operation Descriptor
//!
//! The JSON document a caller submits to `CanCompute` and `Compute`:
//!
//! ```json
//! {
//!   "Operation": { "Class": "com.lynxanalytics.biggraph.graph_operations.OutDegree",
//!                  "Data": { "param": 1 } },
//!   "Inputs":  { "src": "guid-1", "es": "guid-2" },
//!   "Outputs": { "outDegree": "guid-3" }
//! }
//! ```
//!
//! `Data`, `Inputs` and `Outputs` may be omitted.

use crate::primitives::OPERATION_CLASS_PREFIX;
use crate::{Guid, SphynxError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Class name plus parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSpec {
    #[serde(rename = "Class")]
    pub class: String,
    #[serde(rename = "Data", default)]
    pub data: Value,
}

/// A decoded operation instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    #[serde(rename = "Operation")]
    pub operation: OperationSpec,
    #[serde(rename = "Inputs", default)]
    pub inputs: BTreeMap<String, Guid>,
    #[serde(rename = "Outputs", default)]
    pub outputs: BTreeMap<String, Guid>,
}

impl OperationDescriptor {
    /// Start a descriptor for the registry name `short_name`.
    #[must_use]
    pub fn new(short_name: &str) -> Self {
        Self {
            operation: OperationSpec {
                class: format!("{}{}", OPERATION_CLASS_PREFIX, short_name),
                data: Value::Object(serde_json::Map::new()),
            },
            inputs: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn input(mut self, name: &str, guid: impl Into<Guid>) -> Self {
        self.inputs.insert(name.to_string(), guid.into());
        self
    }

    #[must_use]
    pub fn output(mut self, name: &str, guid: impl Into<Guid>) -> Self {
        self.outputs.insert(name.to_string(), guid.into());
        self
    }

    #[must_use]
    pub fn param(mut self, name: &str, value: impl Into<Value>) -> Self {
        if !self.operation.data.is_object() {
            self.operation.data = Value::Object(serde_json::Map::new());
        }
        if let Value::Object(map) = &mut self.operation.data {
            map.insert(name.to_string(), value.into());
        }
        self
    }

    /// Decode a descriptor from its JSON text.
    pub fn parse(json: &str) -> Result<Self, SphynxError> {
        serde_json::from_str(json).map_err(|e| SphynxError::InvalidDescriptor(e.to_string()))
    }

    /// Encode back to JSON text.
    pub fn to_json(&self) -> Result<String, SphynxError> {
        serde_json::to_string(self).map_err(|e| SphynxError::Serialization(e.to_string()))
    }

    /// Registry name: the class with the namespace prefix stripped.
    ///
    /// `None` when the class lacks the exact prefix or nothing follows it.
    #[must_use]
    pub fn short_name(&self) -> Option<&str> {
        self.operation
            .class
            .strip_prefix(OPERATION_CLASS_PREFIX)
            .filter(|name| !name.is_empty())
    }

    /// Raw parameter value, if present.
    #[must_use]
    pub fn param_value(&self, name: &str) -> Option<&Value> {
        self.operation.data.get(name)
    }
}
