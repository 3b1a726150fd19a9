//! # Background Persistence
//!
//! A fixed pool of workers writes computed entities to the ordered disk
//! area after the RPC has been answered from memory.
//!
//! Each worker owns a bounded queue. Jobs are routed by GUID hash, so all
//! writes for one GUID happen on one worker, in order. A full queue makes
//! `enqueue` wait instead of dropping work. Failures are logged and never
//! reach the caller; the entity is still correct in memory.

use sphynx_core::{Entity, EntityStore, Guid, PersistList};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// One entity to write.
#[derive(Debug)]
struct PersistJob {
    guid: Guid,
    entity: Arc<Entity>,
}

/// Handle used by request handlers to schedule writes.
///
/// Cloning is cheap. Workers stop once every clone has been dropped and
/// their queues are drained.
#[derive(Debug, Clone)]
pub struct Persister {
    senders: Arc<[mpsc::Sender<PersistJob>]>,
}

impl Persister {
    /// Start `workers` workers, each with a queue of `capacity` jobs.
    ///
    /// Must be called inside a tokio runtime. Both values are clamped to 1.
    pub fn spawn(
        store: Arc<EntityStore>,
        workers: usize,
        capacity: usize,
    ) -> (Self, Vec<JoinHandle<()>>) {
        let workers = workers.max(1);
        let mut senders = Vec::with_capacity(workers);
        let mut handles = Vec::with_capacity(workers);

        for worker_id in 0..workers {
            let (tx, rx) = mpsc::channel::<PersistJob>(capacity.max(1));
            handles.push(tokio::spawn(run_worker(worker_id, Arc::clone(&store), rx)));
            senders.push(tx);
        }

        tracing::info!(
            "Persistence pool started: {} workers, queue capacity {}",
            workers,
            capacity
        );
        (
            Self {
                senders: senders.into(),
            },
            handles,
        )
    }

    /// Queue every entity of `list`; waits while a target queue is full.
    ///
    /// Returns the number of jobs accepted.
    pub async fn enqueue(&self, list: PersistList) -> usize {
        let mut accepted = 0;
        for (guid, entity) in list {
            let idx = worker_index(&guid, self.senders.len());
            let job = PersistJob { guid, entity };
            match self.senders[idx].send(job).await {
                Ok(()) => accepted += 1,
                Err(mpsc::error::SendError(job)) => {
                    tracing::error!("Persistence worker {} is gone; {} not saved", idx, job.guid);
                }
            }
        }
        accepted
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.senders.len()
    }
}

fn worker_index(guid: &Guid, workers: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    guid.hash(&mut hasher);
    (hasher.finish() % workers.max(1) as u64) as usize
}

async fn run_worker(worker_id: usize, store: Arc<EntityStore>, mut rx: mpsc::Receiver<PersistJob>) {
    while let Some(job) = rx.recv().await {
        let guid = job.guid.clone();
        let store = Arc::clone(&store);
        let result =
            tokio::task::spawn_blocking(move || store.persist(&job.guid, &job.entity)).await;

        match result {
            Ok(Ok(true)) => tracing::debug!("Worker {} persisted {}", worker_id, guid),
            Ok(Ok(false)) => {}
            Ok(Err(e)) => tracing::warn!("Failed to persist {}: {}", guid, e),
            Err(e) => tracing::error!("Persistence task for {} aborted: {}", guid, e),
        }
    }
    tracing::debug!("Persistence worker {} stopped", worker_id);
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sphynx_core::{Scalar, VertexSet};
    use tempfile::{TempDir, tempdir};

    fn store() -> (TempDir, Arc<EntityStore>) {
        let temp = tempdir().expect("temp dir");
        let store = EntityStore::open(temp.path().join("o"), temp.path().join("u")).expect("store");
        (temp, Arc::new(store))
    }

    fn job(guid: &str, n: usize) -> (Guid, Arc<Entity>) {
        (Guid::new(guid), Arc::new(Entity::from(VertexSet::with_len(n))))
    }

    #[test]
    fn routing_is_stable() {
        let guid = Guid::new("same");
        let first = worker_index(&guid, 4);
        for _ in 0..10 {
            assert_eq!(worker_index(&guid, 4), first);
        }
        assert!(first < 4);
        assert_eq!(worker_index(&guid, 1), 0);
    }

    #[tokio::test]
    async fn drains_queue_on_shutdown() {
        let (_temp, store) = store();
        let (persister, handles) = Persister::spawn(Arc::clone(&store), 3, 2);

        let list: PersistList = (0..20).map(|i| job(&format!("g{}", i), i)).collect();
        assert_eq!(persister.enqueue(list).await, 20);

        drop(persister);
        for handle in handles {
            handle.await.expect("worker");
        }
        for i in 0..20 {
            assert!(store.has_on_disk(&Guid::new(format!("g{}", i))).expect("probe"));
        }
    }

    #[tokio::test]
    async fn later_write_for_same_guid_wins() {
        let (_temp, store) = store();
        let (persister, handles) = Persister::spawn(Arc::clone(&store), 2, 1);

        persister
            .enqueue(vec![job("g", 1), job("g", 2), job("g", 3)])
            .await;
        drop(persister);
        for handle in handles {
            handle.await.expect("worker");
        }
        let loaded = store.load_from_disk(&Guid::new("g")).expect("load");
        assert_eq!(loaded.len(), 3);
    }

    #[tokio::test]
    async fn scalars_are_skipped() {
        let (_temp, store) = store();
        let (persister, handles) = Persister::spawn(Arc::clone(&store), 1, 4);

        let scalar = (Guid::new("s"), Arc::new(Entity::from(Scalar::new(1))));
        persister.enqueue(vec![scalar]).await;
        drop(persister);
        for handle in handles {
            handle.await.expect("worker");
        }
        assert!(!store.has_on_disk(&Guid::new("s")).expect("probe"));
    }
}
