//! Shelf storage port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::record::Snapshot;
use crate::error::PersistenceError;

/// Name written to a freshly created shelf metadata file.
pub const DEFAULT_SHELF_NAME: &str = "expressactivatorshelf";

/// Descriptor stored next to the registry snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelfMetadata {
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ShelfMetadata {
    fn default() -> Self {
        Self {
            name: DEFAULT_SHELF_NAME.to_string(),
            extra: Map::new(),
        }
    }
}

/// Durable home of the registry snapshot.
///
/// The snapshot is always read and written as a whole. Implementations must
/// make `persist` atomic: after a failed call the previous snapshot is still
/// readable.
#[async_trait]
pub trait ShelfStore: Send + Sync {
    /// Create the shelf and its files with defaults if missing. Idempotent.
    async fn ensure(&self) -> Result<(), PersistenceError>;

    /// Read the full snapshot.
    async fn load(&self) -> Result<Snapshot, PersistenceError>;

    /// Replace the stored snapshot.
    async fn persist(&self, snapshot: &Snapshot) -> Result<(), PersistenceError>;

    /// Read the shelf metadata.
    async fn metadata(&self) -> Result<ShelfMetadata, PersistenceError>;
}
