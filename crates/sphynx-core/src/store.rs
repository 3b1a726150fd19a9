//! # Tiered Entity Store
//!
//! The GUID-addressed home of every resident entity, backed by the ordered
//! disk area.
//!
//! ## Tiers
//!
//! | Tier      | Probe           | Read              | Write      |
//! |-----------|-----------------|-------------------|------------|
//! | Memory    | `contains`      | `get`             | `put`      |
//! | Disk      | `has_on_disk`   | `load_from_disk`  | `persist`  |
//!
//! `get` never falls through to disk. Promotion is explicit
//! (`promote_from_disk`) so callers decide when memory use grows.
//!
//! ## Locking
//!
//! One mutex guards the map. Entities are stored behind `Arc`, so readers
//! clone a handle under the lock and do all decoding, computing and disk I/O
//! after releasing it. Stored entities are never mutated in place.

use crate::storage::{OrderedDisk, UnorderedDisk};
use crate::{Entity, EntityKind, Guid, SphynxError};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Concurrency-safe entity cache with ordered-disk spill and recall.
#[derive(Debug)]
pub struct EntityStore {
    entities: Mutex<HashMap<Guid, Arc<Entity>>>,
    ordered: OrderedDisk,
    unordered: UnorderedDisk,
}

impl EntityStore {
    /// Open a store over the two disk areas, creating their roots.
    pub fn open(
        data_dir: impl AsRef<Path>,
        unordered_data_dir: impl AsRef<Path>,
    ) -> Result<Self, SphynxError> {
        Ok(Self {
            entities: Mutex::new(HashMap::new()),
            ordered: OrderedDisk::open(data_dir)?,
            unordered: UnorderedDisk::open(unordered_data_dir)?,
        })
    }

    // Every critical section is a single map call, so a panic elsewhere
    // cannot leave the map half-updated; recover from poisoning.
    fn map(&self) -> MutexGuard<'_, HashMap<Guid, Arc<Entity>>> {
        self.entities.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // MEMORY TIER
    // =========================================================================

    /// Memory-only lookup.
    #[must_use]
    pub fn get(&self, guid: &Guid) -> Option<Arc<Entity>> {
        self.map().get(guid).cloned()
    }

    /// Whether `guid` is resident in memory.
    #[must_use]
    pub fn contains(&self, guid: &Guid) -> bool {
        self.map().contains_key(guid)
    }

    /// Insert or overwrite; the last writer wins.
    pub fn put(&self, guid: Guid, entity: impl Into<Arc<Entity>>) {
        let entity = entity.into();
        tracing::trace!(guid = %guid, kind = %entity.kind(), "entity stored");
        self.map().insert(guid, entity);
    }

    /// Insert a batch under one lock acquisition.
    pub fn put_all(&self, entries: impl IntoIterator<Item = (Guid, Arc<Entity>)>) {
        let mut map = self.map();
        for (guid, entity) in entries {
            map.insert(guid, entity);
        }
    }

    /// Number of memory-resident entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map().is_empty()
    }

    // =========================================================================
    // DISK TIER
    // =========================================================================

    /// Probe the ordered area without touching memory.
    pub fn has_on_disk(&self, guid: &Guid) -> Result<bool, SphynxError> {
        self.ordered.contains(guid)
    }

    /// Decode `guid` from the ordered area. Does not insert into memory.
    pub fn load_from_disk(&self, guid: &Guid) -> Result<Entity, SphynxError> {
        self.ordered.load(guid, None)
    }

    /// Decode `guid`, failing with `TypeMismatch` unless it is `expected`.
    pub fn load_from_disk_as(
        &self,
        guid: &Guid,
        expected: EntityKind,
    ) -> Result<Entity, SphynxError> {
        self.ordered.load(guid, Some(expected))
    }

    /// Load `guid` from disk and install it in memory.
    pub fn promote_from_disk(&self, guid: &Guid) -> Result<(), SphynxError> {
        let entity = self.load_from_disk(guid)?;
        self.put(guid.clone(), entity);
        Ok(())
    }

    /// Write `entity` to the ordered area.
    ///
    /// Scalars are never persisted; for them this returns `Ok(false)`.
    pub fn persist(&self, guid: &Guid, entity: &Entity) -> Result<bool, SphynxError> {
        if entity.is_scalar() {
            return Ok(false);
        }
        self.ordered.save(guid, entity)?;
        Ok(true)
    }

    #[must_use]
    pub fn ordered(&self) -> &OrderedDisk {
        &self.ordered
    }

    #[must_use]
    pub fn unordered(&self) -> &UnorderedDisk {
        &self.unordered
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Attribute, Scalar, VertexSet};
    use tempfile::{TempDir, tempdir};

    fn open_store() -> (TempDir, EntityStore) {
        let temp = tempdir().expect("temp dir");
        let store = EntityStore::open(temp.path().join("ordered"), temp.path().join("unordered"))
            .expect("open store");
        (temp, store)
    }

    #[test]
    fn get_does_not_fall_through_to_disk() {
        let (_temp, store) = open_store();
        let guid = Guid::new("vs");
        let entity = Entity::from(VertexSet::with_len(3));
        assert!(store.persist(&guid, &entity).expect("persist"));

        assert!(store.has_on_disk(&guid).expect("probe"));
        assert!(store.get(&guid).is_none());
        assert!(!store.contains(&guid));

        store.promote_from_disk(&guid).expect("promote");
        assert_eq!(store.get(&guid).as_deref(), Some(&entity));
    }

    #[test]
    fn last_put_wins() {
        let (_temp, store) = open_store();
        let guid = Guid::new("g");
        store.put(guid.clone(), Entity::from(VertexSet::with_len(1)));
        store.put(guid.clone(), Entity::from(VertexSet::with_len(2)));
        assert_eq!(store.get(&guid).map(|e| e.len()), Some(2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn scalars_are_not_persisted() {
        let (_temp, store) = open_store();
        let guid = Guid::new("s");
        let written = store
            .persist(&guid, &Entity::from(Scalar::new(42)))
            .expect("persist");
        assert!(!written);
        assert!(!store.has_on_disk(&guid).expect("probe"));
    }

    #[test]
    fn typed_load_checks_kind() {
        let (_temp, store) = open_store();
        let guid = Guid::new("attr");
        let attr = Attribute::new(vec![1_i64, 2], vec![true, false]).expect("attribute");
        store.persist(&guid, &Entity::from(attr)).expect("persist");

        assert!(store.load_from_disk_as(&guid, EntityKind::LongAttribute).is_ok());
        assert!(matches!(
            store.load_from_disk_as(&guid, EntityKind::DoubleAttribute),
            Err(SphynxError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn concurrent_puts_are_all_visible() {
        let (_temp, store) = open_store();
        let store = Arc::new(store);
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        let guid = Guid::new(format!("t{}-{}", t, i));
                        store.put(guid, Entity::from(VertexSet::with_len(i)));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread");
        }
        assert_eq!(store.len(), 400);
    }
}
