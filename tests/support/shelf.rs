use std::path::Path;
use std::sync::Arc;

use kgrid_node::adapter::outbound::shelf::FsShelf;
use kgrid_node::application::ActivationRegistry;
use kgrid_node::domain::{ActivationRecord, ActivationStatus, ObjectId, SourceDescriptor};
use kgrid_node::port::outbound::shelf::ShelfStore;
use kgrid_node::testkit::executor::StubFactory;
use tempfile::TempDir;

/// A created shelf inside a fresh temporary directory.
pub async fn temp_shelf() -> (TempDir, Arc<FsShelf>) {
    let dir = TempDir::new().expect("create temp dir");
    let shelf = Arc::new(FsShelf::new(dir.path().join("shelf")));
    shelf.ensure().await.expect("create shelf");
    (dir, shelf)
}

/// A loaded registry over `shelf`.
pub async fn loaded_registry(
    shelf: Arc<FsShelf>,
    factory: Arc<StubFactory>,
) -> Arc<ActivationRegistry> {
    let registry = Arc::new(ActivationRegistry::new(shelf, factory));
    registry.load().await.expect("load registry");
    registry
}

pub fn record(uri: &str, status: ActivationStatus, source: SourceDescriptor) -> ActivationRecord {
    let mut record = ActivationRecord::new(ObjectId::for_uri(uri).expect("valid uri"), uri, source);
    record.status = status;
    record
}

pub fn read_snapshot_json(shelf_root: &Path) -> serde_json::Value {
    let content =
        std::fs::read_to_string(shelf_root.join("context.json")).expect("read context.json");
    serde_json::from_str(&content).expect("parse context.json")
}
