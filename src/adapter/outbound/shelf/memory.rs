//! In-memory shelf for tests and ephemeral nodes.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::record::Snapshot;
use crate::error::PersistenceError;
use crate::port::outbound::shelf::{ShelfMetadata, ShelfStore};

/// Shelf that keeps its snapshot in memory.
///
/// Writes can be made to fail on demand to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryShelf {
    snapshot: RwLock<Snapshot>,
    metadata: RwLock<ShelfMetadata>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryShelf {
    /// Create a new empty memory shelf.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a shelf pre-populated with `snapshot`.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
            ..Self::default()
        }
    }

    /// Make subsequent `persist` calls fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `persist` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Copy of the currently stored snapshot.
    pub fn stored(&self) -> Snapshot {
        self.snapshot.read().clone()
    }
}

#[async_trait]
impl ShelfStore for MemoryShelf {
    async fn ensure(&self) -> Result<(), PersistenceError> {
        Ok(())
    }

    async fn load(&self) -> Result<Snapshot, PersistenceError> {
        Ok(self.snapshot.read().clone())
    }

    async fn persist(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::Write {
                path: "memory".into(),
                source: std::io::Error::other("writes disabled"),
            });
        }
        *self.snapshot.write() = snapshot.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn metadata(&self) -> Result<ShelfMetadata, PersistenceError> {
        Ok(self.metadata.read().clone())
    }
}
