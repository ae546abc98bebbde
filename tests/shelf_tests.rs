mod support;

use std::sync::Arc;

use kgrid_node::adapter::outbound::shelf::FsShelf;
use kgrid_node::application::ActivationRegistry;
use kgrid_node::domain::{ActivationStatus, ObjectId, SourceDescriptor};
use kgrid_node::error::PersistenceError;
use kgrid_node::port::outbound::shelf::ShelfStore;
use kgrid_node::testkit::executor::{echo_source, StubFactory};
use serde_json::json;
use support::shelf::{loaded_registry, read_snapshot_json, temp_shelf};
use tempfile::TempDir;

#[tokio::test]
async fn fresh_shelf_starts_empty_and_records_activation() {
    let (_dir, shelf) = temp_shelf().await;
    let registry = loaded_registry(Arc::clone(&shelf), Arc::new(StubFactory::new())).await;
    assert!(registry.is_empty());

    let id = registry
        .install("ark:/hello/world", SourceDescriptor::inline(json!("hi")).with_version("v1"))
        .await
        .unwrap();
    registry.activate(&id).await.unwrap();

    let stored = read_snapshot_json(shelf.root());
    let entry = &stored[id.as_str()];
    assert_eq!(entry["id"], id.as_str());
    assert_eq!(entry["uri"], "ark:/hello/world");
    assert_eq!(entry["status"], "Activated");
    assert_eq!(entry["source"]["kind"], "inline");
    assert_eq!(entry["source"]["version"], "v1");

    let metadata: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(shelf.root().join("package.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(metadata["name"], "expressactivatorshelf");
}

#[tokio::test]
async fn legacy_src_key_is_read_and_rewritten_as_source() {
    let dir = TempDir::new().unwrap();
    let uri = "ark:/legacy/object";
    let id = ObjectId::for_uri(uri).unwrap();
    let legacy = json!({
        id.as_str(): {
            "id": id.as_str(),
            "uri": uri,
            "status": "Deactivated",
            "src": {"kind": "inline", "body": {"answer": 42}, "artifact": "legacy.js"}
        }
    });
    std::fs::write(dir.path().join("context.json"), legacy.to_string()).unwrap();

    let shelf = Arc::new(FsShelf::new(dir.path()));
    shelf.ensure().await.unwrap();
    let registry = loaded_registry(Arc::clone(&shelf), Arc::new(StubFactory::new())).await;

    let record = registry.get(&id).unwrap();
    assert_eq!(record.status, ActivationStatus::Deactivated);
    assert_eq!(record.source.extra.get("artifact"), Some(&json!("legacy.js")));

    registry.activate(&id).await.unwrap();
    let stored = read_snapshot_json(shelf.root());
    assert!(stored[id.as_str()].get("src").is_none());
    assert_eq!(stored[id.as_str()]["source"]["artifact"], "legacy.js");
}

#[tokio::test]
async fn mismatched_key_fails_load() {
    let dir = TempDir::new().unwrap();
    let id = ObjectId::for_uri("ark:/one").unwrap();
    let snapshot = json!({
        id.as_str(): {
            "id": id.as_str(),
            "uri": "ark:/two",
            "status": "Activated",
            "source": echo_source(),
        }
    });
    std::fs::write(dir.path().join("context.json"), snapshot.to_string()).unwrap();

    let registry = ActivationRegistry::new(
        Arc::new(FsShelf::new(dir.path())),
        Arc::new(StubFactory::new()),
    );

    let result = registry.load().await;
    assert!(matches!(result, Err(PersistenceError::KeyMismatch { .. })));
    assert!(registry.is_empty());
}

#[tokio::test]
async fn missing_snapshot_without_ensure_is_a_read_error() {
    let dir = TempDir::new().unwrap();
    let shelf = FsShelf::new(dir.path().join("never-created"));

    assert!(matches!(
        shelf.load().await,
        Err(PersistenceError::Read { .. })
    ));
}
