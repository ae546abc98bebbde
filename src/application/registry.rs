//! Activation registry.
//!
//! The authoritative, in-memory map from object identifier to activation
//! state, kept in step with the shelf snapshot.
//!
//! # Concurrency
//!
//! Every mutation (`load`, `install`, `activate`, `deactivate`, `remove`)
//! runs under a single async writer gate, so mutations are totally ordered.
//! Lookups never wait on the gate; they take a short read lock on the
//! published map and therefore only ever see fully applied transitions.
//!
//! Mutations are write-ahead: the next snapshot is computed and persisted
//! first, and the in-memory map is updated only after the write succeeded.
//! Executor construction and persistence run without holding the map lock.
//!
//! # Invariant
//!
//! An entry holds an executor if and only if it is activated. The [`Slot`]
//! type makes the other combinations unrepresentable.
//!
//! A record stored as activated whose executor could not be rebuilt at
//! startup is held deactivated in memory while the shelf keeps it
//! activated, so a later start retries the build.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::id::ObjectId;
use crate::domain::record::{ActivationRecord, ActivationStatus, Snapshot, SourceDescriptor};
use crate::error::{ActivationError, NotFound, NotFoundReason, PersistenceError, RegistryError};
use crate::port::outbound::executor::{ExecutorFactory, SharedExecutor};
use crate::port::outbound::shelf::ShelfStore;

#[derive(Debug, Clone)]
enum Slot {
    Activated(SharedExecutor),
    Deactivated,
}

#[derive(Debug, Clone)]
struct Entry {
    id: ObjectId,
    uri: String,
    source: SourceDescriptor,
    slot: Slot,
    /// Stored as activated, executor not rebuilt.
    held: bool,
}

impl Entry {
    fn deactivated(record: ActivationRecord) -> Self {
        Self {
            id: record.id,
            uri: record.uri,
            source: record.source,
            slot: Slot::Deactivated,
            held: false,
        }
    }

    fn status(&self) -> ActivationStatus {
        match self.slot {
            Slot::Activated(_) => ActivationStatus::Activated,
            Slot::Deactivated => ActivationStatus::Deactivated,
        }
    }

    fn to_record(&self) -> ActivationRecord {
        self.record_with(self.status())
    }

    /// The record as it belongs on the shelf.
    fn to_persisted(&self) -> ActivationRecord {
        if self.held {
            self.record_with(ActivationStatus::Activated)
        } else {
            self.to_record()
        }
    }

    fn record_with(&self, status: ActivationStatus) -> ActivationRecord {
        ActivationRecord {
            id: self.id.clone(),
            uri: self.uri.clone(),
            status,
            source: self.source.clone(),
        }
    }
}

/// Outcome of [`ActivationRegistry::load`].
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Records whose executor was rebuilt.
    pub activated: Vec<ObjectId>,
    /// Records loaded as deactivated.
    pub deactivated: usize,
    /// Records persisted as activated whose executor could not be built.
    /// They are held deactivated in memory; the shelf is left untouched.
    pub failures: Vec<(ObjectId, ActivationError)>,
}

impl LoadReport {
    #[must_use]
    pub fn total(&self) -> usize {
        self.activated.len() + self.deactivated + self.failures.len()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Registry of activation objects hosted by this node.
pub struct ActivationRegistry {
    shelf: Arc<dyn ShelfStore>,
    factory: Arc<dyn ExecutorFactory>,
    entries: RwLock<HashMap<ObjectId, Entry>>,
    writer: Mutex<()>,
}

impl ActivationRegistry {
    /// Create an empty registry. Call [`load`](Self::load) to populate it.
    pub fn new(shelf: Arc<dyn ShelfStore>, factory: Arc<dyn ExecutorFactory>) -> Self {
        Self {
            shelf,
            factory,
            entries: RwLock::new(HashMap::new()),
            writer: Mutex::new(()),
        }
    }

    /// Replace in-memory state with the shelf snapshot.
    ///
    /// Executors are built eagerly for every activated record. A record whose
    /// executor fails to build is reported and held as deactivated; the other
    /// records are unaffected. Nothing is written to the shelf, so the next
    /// load tries again.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] when the snapshot cannot be read or is
    /// malformed.
    pub async fn load(&self) -> Result<LoadReport, PersistenceError> {
        let _gate = self.writer.lock().await;
        let snapshot = self.shelf.load().await?;

        let mut report = LoadReport::default();
        let mut entries = HashMap::with_capacity(snapshot.len());

        for record in snapshot.records().cloned() {
            let wants_executor = record.status.is_activated();
            let mut entry = Entry::deactivated(record);

            if !wants_executor {
                report.deactivated += 1;
            } else {
                match self.factory.build(&entry.source).await {
                    Ok(executor) => {
                        debug!(id = %entry.id, uri = %entry.uri, "Executor rebuilt");
                        entry.slot = Slot::Activated(executor);
                        report.activated.push(entry.id.clone());
                    }
                    Err(e) => {
                        warn!(id = %entry.id, uri = %entry.uri, error = %e, "Failed to rebuild executor, holding record deactivated");
                        entry.held = true;
                        report.failures.push((entry.id.clone(), e));
                    }
                }
            }
            entries.insert(entry.id.clone(), entry);
        }

        *self.entries.write() = entries;

        info!(
            records = report.total(),
            activated = report.activated.len(),
            failed = report.failures.len(),
            "Registry loaded"
        );
        Ok(report)
    }

    /// Add a deactivated record for `uri`, or replace the source of an
    /// existing deactivated record.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Busy`] if the record is activated,
    /// [`RegistryError::Domain`] for an empty URI, or a persistence error.
    pub async fn install(
        &self,
        uri: &str,
        source: SourceDescriptor,
    ) -> Result<ObjectId, RegistryError> {
        let id = ObjectId::for_uri(uri)?;
        let _gate = self.writer.lock().await;

        let mut next = {
            let entries = self.entries.read();
            if let Some(existing) = entries.get(&id) {
                if let Slot::Activated(_) = existing.slot {
                    return Err(RegistryError::Busy { id });
                }
            }
            snapshot_of(&entries)
        };
        let record = ActivationRecord::new(id.clone(), uri.trim(), source);
        next.insert(record.clone());

        self.shelf.persist(&next).await?;
        self.entries
            .write()
            .insert(id.clone(), Entry::deactivated(record));

        info!(id = %id, uri = %uri, "Object installed");
        Ok(id)
    }

    /// Transition `id` to activated, building its executor.
    ///
    /// Activating an activated record succeeds without side effects.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] for an unknown id,
    /// [`RegistryError::Activation`] if the executor cannot be built (the
    /// record stays deactivated), or a persistence error (nothing changes).
    pub async fn activate(&self, id: &ObjectId) -> Result<(), RegistryError> {
        let _gate = self.writer.lock().await;

        let (source, mut next) = {
            let entries = self.entries.read();
            let entry = entries
                .get(id)
                .ok_or_else(|| NotFound::new(id.as_str(), NotFoundReason::Unknown))?;
            if let Slot::Activated(_) = entry.slot {
                debug!(id = %id, "Already activated");
                return Ok(());
            }
            (entry.source.clone(), snapshot_of(&entries))
        };

        let executor = self.factory.build(&source).await.map_err(|e| {
            warn!(id = %id, error = %e, "Activation failed");
            RegistryError::Activation {
                id: id.clone(),
                source: e,
            }
        })?;

        if let Some(record) = next.get_mut(id) {
            record.status = ActivationStatus::Activated;
        }
        self.shelf.persist(&next).await?;

        if let Some(entry) = self.entries.write().get_mut(id) {
            entry.slot = Slot::Activated(executor);
            entry.held = false;
        }
        info!(id = %id, "Object activated");
        Ok(())
    }

    /// Transition `id` to deactivated, releasing its executor.
    ///
    /// Deactivating a deactivated record succeeds without side effects,
    /// except that a record held deactivated after a failed startup build
    /// is now stored as deactivated too.
    /// Executions already running keep their handle until they finish.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] for an unknown id, or a persistence error
    /// (nothing changes).
    pub async fn deactivate(&self, id: &ObjectId) -> Result<(), RegistryError> {
        let _gate = self.writer.lock().await;

        let mut next = {
            let entries = self.entries.read();
            let entry = entries
                .get(id)
                .ok_or_else(|| NotFound::new(id.as_str(), NotFoundReason::Unknown))?;
            if let (Slot::Deactivated, false) = (&entry.slot, entry.held) {
                debug!(id = %id, "Already deactivated");
                return Ok(());
            }
            snapshot_of(&entries)
        };

        if let Some(record) = next.get_mut(id) {
            record.status = ActivationStatus::Deactivated;
        }
        self.shelf.persist(&next).await?;

        if let Some(entry) = self.entries.write().get_mut(id) {
            entry.slot = Slot::Deactivated;
            entry.held = false;
        }
        info!(id = %id, "Object deactivated");
        Ok(())
    }

    /// Delete the record for `id`, dropping its executor if any.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] for an unknown id, or a persistence error.
    pub async fn remove(&self, id: &ObjectId) -> Result<ActivationRecord, RegistryError> {
        let _gate = self.writer.lock().await;

        let (removed, next) = {
            let entries = self.entries.read();
            let entry = entries
                .get(id)
                .ok_or_else(|| NotFound::new(id.as_str(), NotFoundReason::Unknown))?;
            let mut next = snapshot_of(&entries);
            next.remove(id);
            (entry.to_record(), next)
        };

        self.shelf.persist(&next).await?;
        self.entries.write().remove(id);

        info!(id = %id, uri = %removed.uri, "Object removed");
        Ok(removed)
    }

    /// Live executor for `id`.
    ///
    /// Unknown and deactivated records both yield [`NotFound`]; the reason
    /// tells them apart.
    pub fn lookup_by_hash(&self, id: &ObjectId) -> Result<SharedExecutor, NotFound> {
        let entries = self.entries.read();
        let reason = match entries.get(id).map(|e| &e.slot) {
            Some(Slot::Activated(executor)) => return Ok(Arc::clone(executor)),
            Some(Slot::Deactivated) => NotFoundReason::Deactivated,
            None => NotFoundReason::Unknown,
        };
        debug!(id = %id, %reason, "Lookup missed");
        Err(NotFound::new(id.as_str(), reason))
    }

    /// Live executor for the object with canonical `uri`.
    ///
    /// URIs never seen on this node are an ordinary miss.
    pub fn lookup_by_uri(&self, uri: &str) -> Result<SharedExecutor, NotFound> {
        let id = ObjectId::for_uri(uri).map_err(|_| {
            debug!(uri = %uri, "Lookup with malformed uri");
            NotFound::new(uri, NotFoundReason::MalformedUri)
        })?;
        self.lookup_by_hash(&id)
            .map_err(|miss| NotFound::new(uri, miss.reason))
    }

    /// Persistable view of one record.
    #[must_use]
    pub fn get(&self, id: &ObjectId) -> Option<ActivationRecord> {
        self.entries.read().get(id).map(Entry::to_record)
    }

    #[must_use]
    pub fn status(&self, id: &ObjectId) -> Option<ActivationStatus> {
        self.entries.read().get(id).map(Entry::status)
    }

    /// All records, ordered by identifier.
    #[must_use]
    pub fn records(&self) -> Vec<ActivationRecord> {
        let live: Snapshot = self.entries.read().values().map(Entry::to_record).collect();
        live.records().cloned().collect()
    }

    /// The snapshot the shelf holds for the current in-memory state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        snapshot_of(&self.entries.read())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop every executor and forget all records without touching the
    /// shelf. Used on process shutdown.
    pub async fn shutdown(&self) {
        let _gate = self.writer.lock().await;
        let released = {
            let mut entries = self.entries.write();
            let count = entries
                .values()
                .filter(|e| matches!(e.slot, Slot::Activated(_)))
                .count();
            entries.clear();
            count
        };
        info!(released, "Registry shut down");
    }
}

fn snapshot_of(entries: &HashMap<ObjectId, Entry>) -> Snapshot {
    entries.values().map(Entry::to_persisted).collect()
}
