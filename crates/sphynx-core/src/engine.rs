//! # Engine
//!
//! Request-level dispatch over the store and the registry. Each method
//! corresponds to one RPC; none keeps state between calls beyond the store.
//!
//! ## Compute flow
//!
//! 1. Decode the descriptor, strip the namespace prefix, look up the
//!    operation (`UnsupportedOperation` if absent).
//! 2. Resolve inputs from memory and run the body. Body errors are returned
//!    unchanged; nothing is retried.
//! 3. Derive `<name>-idSet` outputs from the `<name>` edge bundle.
//! 4. Validate and merge all outputs into the store under one lock.
//! 5. Hand back the non-scalar outputs for background persistence.

use crate::accessor::EntityAccessor;
use crate::descriptor::OperationDescriptor;
use crate::entity::VertexSet;
use crate::primitives::ID_SET_SUFFIX;
use crate::registry::OperationRegistry;
use crate::store::EntityStore;
use crate::{Entity, EntityKind, Guid, SphynxError};
use std::sync::Arc;

/// Entities a successful compute wants written to the ordered area.
pub type PersistList = Vec<(Guid, Arc<Entity>)>;

/// The execution core: store plus registry.
#[derive(Debug)]
pub struct Engine {
    store: Arc<EntityStore>,
    registry: OperationRegistry,
}

impl Engine {
    #[must_use]
    pub fn new(store: Arc<EntityStore>, registry: OperationRegistry) -> Self {
        Self { store, registry }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<EntityStore> {
        &self.store
    }

    #[must_use]
    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// Whether `compute` would find an operation for this descriptor.
    pub fn can_compute(&self, descriptor_json: &str) -> Result<bool, SphynxError> {
        let descriptor = OperationDescriptor::parse(descriptor_json)?;
        let found = descriptor
            .short_name()
            .is_some_and(|name| self.registry.contains(name));
        tracing::debug!("CanCompute {} -> {}", descriptor.operation.class, found);
        Ok(found)
    }

    /// Run the described operation and merge its outputs into memory.
    ///
    /// Returns the outputs to persist; scalars are already filtered out.
    pub fn compute(&self, descriptor_json: &str) -> Result<PersistList, SphynxError> {
        let descriptor = OperationDescriptor::parse(descriptor_json)?;
        let name = descriptor
            .short_name()
            .filter(|name| self.registry.contains(name))
            .ok_or_else(|| SphynxError::UnsupportedOperation(descriptor.operation.class.clone()))?;
        let operation = self
            .registry
            .get(name)
            .ok_or_else(|| SphynxError::UnsupportedOperation(name.to_string()))?;

        // Every accepted output must be persistable later.
        for guid in descriptor.outputs.values() {
            guid.validate_path_component()?;
        }

        let mut ea = EntityAccessor::new(&self.store, &descriptor)?;
        operation.execute(&mut ea)?;
        derive_id_sets(&descriptor, &mut ea)?;

        let outputs = ea
            .into_outputs()
            .into_iter()
            .map(|(guid, entity)| {
                entity.validate()?;
                Ok((guid, Arc::new(entity)))
            })
            .collect::<Result<Vec<_>, SphynxError>>()?;

        self.store.put_all(outputs.iter().cloned());
        tracing::info!("Computed {} ({} outputs)", name, outputs.len());

        Ok(outputs
            .into_iter()
            .filter(|(_, entity)| !entity.is_scalar())
            .collect())
    }

    /// JSON text of the scalar stored under `guid`.
    pub fn get_scalar(&self, guid: &Guid) -> Result<String, SphynxError> {
        let entity = self
            .store
            .get(guid)
            .ok_or_else(|| SphynxError::EntityNotFound(guid.clone()))?;
        let scalar = entity.as_scalar(guid)?;
        serde_json::to_string(&scalar.value).map_err(|e| SphynxError::Serialization(e.to_string()))
    }

    #[must_use]
    pub fn has_in_memory(&self, guid: &Guid) -> bool {
        self.store.contains(guid)
    }

    pub fn has_on_ordered_disk(&self, guid: &Guid) -> Result<bool, SphynxError> {
        self.store.has_on_disk(guid)
    }

    /// Promote `guid` from the ordered area into memory.
    pub fn read_from_ordered_disk(&self, guid: &Guid) -> Result<(), SphynxError> {
        self.store.promote_from_disk(guid)?;
        tracing::debug!("Loaded {} from ordered disk", guid);
        Ok(())
    }
}

/// For every declared `<name>-idSet` output, emit a vertex set whose
/// mapping is the edge mapping of output `<name>`.
fn derive_id_sets(
    descriptor: &OperationDescriptor,
    ea: &mut EntityAccessor<'_>,
) -> Result<(), SphynxError> {
    for id_set_name in descriptor.outputs.keys() {
        let Some(bundle_name) = id_set_name.strip_suffix(ID_SET_SUFFIX) else {
            continue;
        };
        let bundle_guid = descriptor
            .outputs
            .get(bundle_name)
            .ok_or_else(|| SphynxError::UnknownSlot(format!("output `{}`", bundle_name)))?;

        let id_set = match ea.produced(bundle_name) {
            Some(Entity::EdgeBundle(eb)) => VertexSet::new(eb.edge_mapping.clone()),
            Some(other) => {
                return Err(SphynxError::type_mismatch(
                    bundle_guid,
                    EntityKind::EdgeBundle,
                    other.kind(),
                ));
            }
            None => {
                return Err(SphynxError::type_mismatch(
                    bundle_guid,
                    EntityKind::EdgeBundle,
                    "no output",
                ));
            }
        };
        ea.output(id_set_name, id_set)?;
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
