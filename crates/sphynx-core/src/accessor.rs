//! # Execution Context
//!
//! `EntityAccessor` is what an operation body sees: its resolved inputs,
//! its parameters and a place to put outputs. It also mediates file
//! handoff to external processes through the unordered staging area.
//!
//! Inputs are resolved from memory when the accessor is built, so an
//! operation body never runs with a missing input.

use crate::descriptor::OperationDescriptor;
use crate::entity::{Attribute, EdgeBundle, Scalar, Tuple2Attribute, VectorAttribute, VertexSet};
use crate::store::EntityStore;
use crate::{Entity, Guid, SphynxError};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// The sandbox one operation invocation runs in.
#[derive(Debug)]
pub struct EntityAccessor<'a> {
    store: &'a EntityStore,
    descriptor: &'a OperationDescriptor,
    inputs: BTreeMap<String, (Guid, Arc<Entity>)>,
    outputs: BTreeMap<String, Entity>,
}

impl<'a> EntityAccessor<'a> {
    /// Resolve every declared input from memory.
    ///
    /// The first input whose GUID is not resident fails with
    /// `EntityNotFound`; disk is never consulted.
    pub fn new(
        store: &'a EntityStore,
        descriptor: &'a OperationDescriptor,
    ) -> Result<Self, SphynxError> {
        let mut inputs = BTreeMap::new();
        for (name, guid) in &descriptor.inputs {
            let entity = store
                .get(guid)
                .ok_or_else(|| SphynxError::EntityNotFound(guid.clone()))?;
            inputs.insert(name.clone(), (guid.clone(), entity));
        }
        Ok(Self {
            store,
            descriptor,
            inputs,
            outputs: BTreeMap::new(),
        })
    }

    // =========================================================================
    // INPUTS
    // =========================================================================

    /// GUID and entity bound to input `name`.
    pub fn input(&self, name: &str) -> Result<(&Guid, &Entity), SphynxError> {
        self.inputs
            .get(name)
            .map(|(guid, entity)| (guid, entity.as_ref()))
            .ok_or_else(|| SphynxError::UnknownSlot(format!("input `{}`", name)))
    }

    pub fn get_vertex_set(&self, name: &str) -> Result<&VertexSet, SphynxError> {
        let (guid, entity) = self.input(name)?;
        entity.as_vertex_set(guid)
    }

    pub fn get_edge_bundle(&self, name: &str) -> Result<&EdgeBundle, SphynxError> {
        let (guid, entity) = self.input(name)?;
        entity.as_edge_bundle(guid)
    }

    pub fn get_string_attribute(&self, name: &str) -> Result<&Attribute<String>, SphynxError> {
        let (guid, entity) = self.input(name)?;
        entity.as_string_attribute(guid)
    }

    pub fn get_double_attribute(&self, name: &str) -> Result<&Attribute<f64>, SphynxError> {
        let (guid, entity) = self.input(name)?;
        entity.as_double_attribute(guid)
    }

    pub fn get_long_attribute(&self, name: &str) -> Result<&Attribute<i64>, SphynxError> {
        let (guid, entity) = self.input(name)?;
        entity.as_long_attribute(guid)
    }

    pub fn get_double_tuple2_attribute(
        &self,
        name: &str,
    ) -> Result<&Tuple2Attribute<f64>, SphynxError> {
        let (guid, entity) = self.input(name)?;
        entity.as_double_tuple2_attribute(guid)
    }

    pub fn get_double_vector_attribute(
        &self,
        name: &str,
    ) -> Result<&VectorAttribute<f64>, SphynxError> {
        let (guid, entity) = self.input(name)?;
        entity.as_double_vector_attribute(guid)
    }

    pub fn get_scalar(&self, name: &str) -> Result<&Scalar, SphynxError> {
        let (guid, entity) = self.input(name)?;
        entity.as_scalar(guid)
    }

    // =========================================================================
    // PARAMETERS
    // =========================================================================

    fn param(&self, name: &str) -> Result<&Value, SphynxError> {
        self.descriptor
            .param_value(name)
            .ok_or_else(|| invalid_param(name, "missing"))
    }

    pub fn get_float_param(&self, name: &str) -> Result<f64, SphynxError> {
        self.param(name)?
            .as_f64()
            .ok_or_else(|| invalid_param(name, "expected a number"))
    }

    /// Like [`Self::get_float_param`], but an absent parameter is `None`.
    pub fn get_optional_float_param(&self, name: &str) -> Result<Option<f64>, SphynxError> {
        match self.descriptor.param_value(name) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.get_float_param(name).map(Some),
        }
    }

    pub fn get_long_param(&self, name: &str) -> Result<i64, SphynxError> {
        self.param(name)?
            .as_i64()
            .ok_or_else(|| invalid_param(name, "expected an integer"))
    }

    pub fn get_string_param(&self, name: &str) -> Result<&str, SphynxError> {
        self.param(name)?
            .as_str()
            .ok_or_else(|| invalid_param(name, "expected a string"))
    }

    pub fn get_string_vector_param(&self, name: &str) -> Result<Vec<String>, SphynxError> {
        let items = self
            .param(name)?
            .as_array()
            .ok_or_else(|| invalid_param(name, "expected a list of strings"))?;
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid_param(name, "expected a list of strings"))
            })
            .collect()
    }

    // =========================================================================
    // OUTPUTS
    // =========================================================================

    /// Whether the caller declared an output slot called `name`.
    #[must_use]
    pub fn has_output(&self, name: &str) -> bool {
        self.descriptor.outputs.contains_key(name)
    }

    /// Register `entity` as output `name`.
    ///
    /// The slot must be declared in the descriptor. Writing the same slot
    /// twice keeps the later entity.
    pub fn output(&mut self, name: &str, entity: impl Into<Entity>) -> Result<(), SphynxError> {
        if !self.has_output(name) {
            return Err(SphynxError::UnknownSlot(format!("output `{}`", name)));
        }
        self.outputs.insert(name.to_string(), entity.into());
        Ok(())
    }

    /// Output produced so far under `name`.
    #[must_use]
    pub fn produced(&self, name: &str) -> Option<&Entity> {
        self.outputs.get(name)
    }

    /// Consume the accessor, pairing each produced output with its GUID.
    pub fn into_outputs(self) -> Vec<(Guid, Entity)> {
        let declared = &self.descriptor.outputs;
        self.outputs
            .into_iter()
            .filter_map(|(name, entity)| declared.get(&name).map(|guid| (guid.clone(), entity)))
            .collect()
    }

    // =========================================================================
    // EXTERNAL PROCESS HANDOFF
    // =========================================================================

    /// Stage input `name` as JSON in the unordered area and return its path.
    pub fn write_to_disk(&self, name: &str) -> Result<PathBuf, SphynxError> {
        let (guid, entity) = self.input(name)?;
        self.store.unordered().write_json(guid, entity)
    }

    /// Register outputs from the JSON an external process printed.
    ///
    /// Expects `{ "<outputName>": <entity JSON>, ... }`. Anything that does
    /// not parse, violates entity invariants or names an undeclared output
    /// is reported as `ExternalProcessFailure`.
    pub fn output_from_json(&mut self, command: &str, json: &[u8]) -> Result<(), SphynxError> {
        let failure = |stderr: String| SphynxError::ExternalProcessFailure {
            command: command.to_string(),
            status: "invalid output".to_string(),
            stderr,
        };

        let parsed: BTreeMap<String, Entity> =
            serde_json::from_slice(json).map_err(|e| failure(format!("unparseable JSON: {}", e)))?;
        for (name, entity) in parsed {
            entity.validate().map_err(|e| failure(e.to_string()))?;
            self.output(&name, entity).map_err(|e| failure(e.to_string()))?;
        }
        Ok(())
    }
}

fn invalid_param(name: &str, reason: &str) -> SphynxError {
    SphynxError::InvalidParameter {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{TempDir, tempdir};

    fn setup() -> (TempDir, EntityStore) {
        let temp = tempdir().expect("temp dir");
        let store = EntityStore::open(temp.path().join("o"), temp.path().join("u")).expect("store");
        store.put(Guid::new("vs"), Entity::from(VertexSet::with_len(2)));
        (temp, store)
    }

    #[test]
    fn missing_input_fails_before_body() {
        let (_temp, store) = setup();
        let desc = OperationDescriptor::new("X").input("vs", "absent");
        assert!(matches!(
            EntityAccessor::new(&store, &desc),
            Err(SphynxError::EntityNotFound(g)) if g.as_str() == "absent"
        ));
    }

    #[test]
    fn typed_input_mismatch() {
        let (_temp, store) = setup();
        let desc = OperationDescriptor::new("X").input("attr", "vs");
        let ea = EntityAccessor::new(&store, &desc).expect("accessor");
        assert!(matches!(
            ea.get_string_attribute("attr"),
            Err(SphynxError::TypeMismatch { .. })
        ));
        assert!(matches!(
            ea.get_vertex_set("nope"),
            Err(SphynxError::UnknownSlot(_))
        ));
    }

    #[test]
    fn parameter_readers() {
        let (_temp, store) = setup();
        let desc = OperationDescriptor::new("X")
            .param("f", 2.5)
            .param("n", 7)
            .param("s", "text")
            .param("list", serde_json::json!(["a", "b"]))
            .param("mixed", serde_json::json!(["a", 1]));
        let ea = EntityAccessor::new(&store, &desc).expect("accessor");

        assert_eq!(ea.get_float_param("f").expect("f"), 2.5);
        assert_eq!(ea.get_float_param("n").expect("n as float"), 7.0);
        assert_eq!(ea.get_long_param("n").expect("n"), 7);
        assert_eq!(ea.get_string_param("s").expect("s"), "text");
        assert_eq!(ea.get_string_vector_param("list").expect("list"), vec!["a", "b"]);
        assert_eq!(ea.get_optional_float_param("absent").expect("absent"), None);

        assert!(matches!(
            ea.get_float_param("s"),
            Err(SphynxError::InvalidParameter { .. })
        ));
        assert!(ea.get_string_vector_param("mixed").is_err());
        assert!(ea.get_long_param("missing").is_err());
    }

    #[test]
    fn output_requires_declared_slot() {
        let (_temp, store) = setup();
        let desc = OperationDescriptor::new("X").output("out", "g-out");
        let mut ea = EntityAccessor::new(&store, &desc).expect("accessor");

        ea.output("out", VertexSet::with_len(1)).expect("declared");
        assert!(matches!(
            ea.output("other", VertexSet::with_len(1)),
            Err(SphynxError::UnknownSlot(_))
        ));
        let outputs = ea.into_outputs();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].0, Guid::new("g-out"));
    }

    #[test]
    fn write_to_disk_stages_json() {
        let (_temp, store) = setup();
        let desc = OperationDescriptor::new("X").input("vs", "vs");
        let ea = EntityAccessor::new(&store, &desc).expect("accessor");
        let path = ea.write_to_disk("vs").expect("stage");
        assert!(path.starts_with(store.unordered().root()));
        assert!(path.exists());
    }

    #[test]
    fn output_from_json_validates() {
        let (_temp, store) = setup();
        let desc = OperationDescriptor::new("X").output("emb", "g-emb");
        let mut ea = EntityAccessor::new(&store, &desc).expect("accessor");

        let good = br#"{"emb": {"kind": "DoubleVectorAttribute", "values": [[1.0, 2.0]], "defined": [true]}}"#;
        ea.output_from_json("helper", good).expect("valid output");
        assert!(ea.produced("emb").is_some());

        let misaligned = br#"{"emb": {"kind": "DoubleAttribute", "values": [1.0], "defined": []}}"#;
        assert!(matches!(
            ea.output_from_json("helper", misaligned),
            Err(SphynxError::ExternalProcessFailure { .. })
        ));
        assert!(matches!(
            ea.output_from_json("helper", b"not json"),
            Err(SphynxError::ExternalProcessFailure { .. })
        ));
        let undeclared = br#"{"other": {"kind": "VertexSet", "mapping_to_unordered": [1]}}"#;
        assert!(ea.output_from_json("helper", undeclared).is_err());
    }
}
