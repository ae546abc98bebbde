mod support;

use std::sync::Arc;
use std::time::Duration;

use kgrid_node::adapter::outbound::shelf::{FsShelf, MemoryShelf};
use kgrid_node::application::ActivationRegistry;
use kgrid_node::domain::{ActivationStatus, ObjectId, Snapshot};
use kgrid_node::error::{NotFoundReason, RegistryError};
use kgrid_node::port::outbound::shelf::ShelfStore;
use kgrid_node::testkit::executor::{broken_source, echo_source, StubFactory};
use support::shelf::{loaded_registry, record, temp_shelf};

fn assert_executor_iff_activated(registry: &ActivationRegistry) {
    for record in registry.records() {
        let live = registry.lookup_by_hash(&record.id).is_ok();
        assert_eq!(
            live,
            record.status.is_activated(),
            "record {} is {} but live executor = {live}",
            record.uri,
            record.status
        );
    }
}

#[tokio::test]
async fn concurrent_transitions_keep_memory_and_shelf_consistent() {
    let (_dir, shelf) = temp_shelf().await;
    let factory = Arc::new(StubFactory::with_build_delay(Duration::from_millis(2)));
    let registry = loaded_registry(Arc::clone(&shelf), factory).await;

    let mut ids = Vec::new();
    for n in 0..4 {
        let id = registry
            .install(&format!("ark:/object/{n}"), echo_source())
            .await
            .unwrap();
        ids.push(id);
    }

    let mut tasks = Vec::new();
    for n in 0..40 {
        let registry = Arc::clone(&registry);
        let id = ids[n % ids.len()].clone();
        tasks.push(tokio::spawn(async move {
            if n % 3 == 0 {
                registry.deactivate(&id).await
            } else {
                registry.activate(&id).await
            }
        }));
    }

    // Readers race the writers and must only ever see whole transitions.
    for _ in 0..50 {
        for id in &ids {
            let status = registry.status(id);
            let live = registry.lookup_by_hash(id);
            if live.is_ok() {
                assert!(status.is_some());
            }
        }
        tokio::task::yield_now().await;
    }

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_executor_iff_activated(&registry);
    assert_eq!(shelf.load().await.unwrap(), registry.snapshot());
}

#[tokio::test]
async fn state_survives_restart() {
    let (_dir, shelf) = temp_shelf().await;
    let registry = loaded_registry(Arc::clone(&shelf), Arc::new(StubFactory::new())).await;

    let a = registry.install("ark:/a", echo_source()).await.unwrap();
    let b = registry.install("ark:/b", echo_source()).await.unwrap();
    registry.activate(&a).await.unwrap();
    registry.shutdown().await;

    let restarted = loaded_registry(
        Arc::new(FsShelf::new(shelf.root())),
        Arc::new(StubFactory::new()),
    )
    .await;

    assert_eq!(restarted.status(&a), Some(ActivationStatus::Activated));
    assert_eq!(restarted.status(&b), Some(ActivationStatus::Deactivated));
    assert!(restarted.lookup_by_uri("ark:/a").is_ok());
    assert_eq!(
        restarted.lookup_by_uri("ark:/b").unwrap_err().reason,
        NotFoundReason::Deactivated
    );
    assert_executor_iff_activated(&restarted);
}

#[tokio::test]
async fn load_holds_unbuildable_records_deactivated_without_rewriting_shelf() {
    let good = record("ark:/good", ActivationStatus::Activated, echo_source());
    let bad = record("ark:/bad", ActivationStatus::Activated, broken_source());
    let idle = record("ark:/idle", ActivationStatus::Deactivated, echo_source());
    let (good_id, bad_id) = (good.id.clone(), bad.id.clone());

    let shelf = Arc::new(MemoryShelf::with_snapshot(
        vec![good, bad, idle].into_iter().collect(),
    ));
    let registry = ActivationRegistry::new(Arc::clone(&shelf) as Arc<dyn ShelfStore>, Arc::new(StubFactory::new()));

    let report = registry.load().await.unwrap();

    assert_eq!(report.activated, vec![good_id.clone()]);
    assert_eq!(report.deactivated, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, bad_id);
    assert_eq!(report.total(), 3);

    assert!(registry.lookup_by_hash(&good_id).is_ok());
    assert_eq!(registry.status(&bad_id), Some(ActivationStatus::Deactivated));
    assert_eq!(
        shelf.stored().get(&bad_id).map(|r| r.status),
        Some(ActivationStatus::Activated)
    );
    assert_eq!(shelf.write_count(), 0);
    assert_executor_iff_activated(&registry);
}

#[tokio::test]
async fn failed_startup_build_recovers_after_restart() {
    let (_dir, shelf) = temp_shelf().await;
    shelf
        .persist(
            &vec![record("ark:/flaky", ActivationStatus::Activated, echo_source())]
                .into_iter()
                .collect(),
        )
        .await
        .unwrap();
    let id = ObjectId::for_uri("ark:/flaky").unwrap();

    let factory = Arc::new(StubFactory::new());
    factory.fail_all(true);
    let first = ActivationRegistry::new(Arc::clone(&shelf) as Arc<dyn ShelfStore>, factory);
    let report = first.load().await.unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(first.status(&id), Some(ActivationStatus::Deactivated));
    assert_eq!(
        shelf.load().await.unwrap().get(&id).map(|r| r.status),
        Some(ActivationStatus::Activated)
    );
    first.shutdown().await;

    let restarted = loaded_registry(
        Arc::new(FsShelf::new(shelf.root())),
        Arc::new(StubFactory::new()),
    )
    .await;

    assert_eq!(restarted.status(&id), Some(ActivationStatus::Activated));
    assert!(restarted.lookup_by_uri("ark:/flaky").is_ok());
}

#[tokio::test]
async fn deactivating_held_record_stores_deactivated() {
    let held = record("ark:/held", ActivationStatus::Activated, broken_source());
    let id = held.id.clone();
    let shelf = Arc::new(MemoryShelf::with_snapshot(vec![held].into_iter().collect()));
    let registry = ActivationRegistry::new(Arc::clone(&shelf) as Arc<dyn ShelfStore>, Arc::new(StubFactory::new()));
    registry.load().await.unwrap();

    registry.deactivate(&id).await.unwrap();

    assert_eq!(shelf.write_count(), 1);
    assert_eq!(
        shelf.stored().get(&id).map(|r| r.status),
        Some(ActivationStatus::Deactivated)
    );
    assert_eq!(registry.status(&id), Some(ActivationStatus::Deactivated));

    registry.deactivate(&id).await.unwrap();
    assert_eq!(shelf.write_count(), 1);
}

#[tokio::test]
async fn failed_persist_leaves_state_unchanged() {
    let shelf = Arc::new(MemoryShelf::new());
    let registry = ActivationRegistry::new(Arc::clone(&shelf) as Arc<dyn ShelfStore>, Arc::new(StubFactory::new()));
    let id = registry.install("ark:/a", echo_source()).await.unwrap();
    let before = shelf.stored();

    shelf.fail_writes(true);
    let result = registry.activate(&id).await;

    assert!(matches!(result, Err(RegistryError::Persistence(_))));
    assert_eq!(registry.status(&id), Some(ActivationStatus::Deactivated));
    assert!(registry.lookup_by_hash(&id).is_err());
    assert_eq!(shelf.stored(), before);

    shelf.fail_writes(false);
    registry.activate(&id).await.unwrap();
    assert!(registry.lookup_by_hash(&id).is_ok());
}

#[tokio::test]
async fn failed_activation_keeps_record_deactivated() {
    let shelf = Arc::new(MemoryShelf::new());
    let registry = ActivationRegistry::new(Arc::clone(&shelf) as Arc<dyn ShelfStore>, Arc::new(StubFactory::new()));
    let id = registry.install("ark:/bad", broken_source()).await.unwrap();
    let writes = shelf.write_count();

    let result = registry.activate(&id).await;

    assert!(matches!(result, Err(RegistryError::Activation { .. })));
    assert_eq!(registry.status(&id), Some(ActivationStatus::Deactivated));
    assert_eq!(shelf.write_count(), writes);
}

#[tokio::test]
async fn deactivate_is_idempotent() {
    let shelf = Arc::new(MemoryShelf::new());
    let registry = ActivationRegistry::new(Arc::clone(&shelf) as Arc<dyn ShelfStore>, Arc::new(StubFactory::new()));
    let id = registry.install("ark:/a", echo_source()).await.unwrap();
    registry.activate(&id).await.unwrap();

    registry.deactivate(&id).await.unwrap();
    let writes = shelf.write_count();
    registry.deactivate(&id).await.unwrap();

    assert_eq!(shelf.write_count(), writes);
    assert_eq!(registry.status(&id), Some(ActivationStatus::Deactivated));
    assert_eq!(
        registry.lookup_by_hash(&id).unwrap_err().reason,
        NotFoundReason::Deactivated
    );
}

#[tokio::test]
async fn deactivate_unknown_is_not_found() {
    let registry = ActivationRegistry::new(Arc::new(MemoryShelf::new()), Arc::new(StubFactory::new()));
    let id = ObjectId::for_uri("ark:/nobody").unwrap();

    assert!(matches!(
        registry.deactivate(&id).await,
        Err(RegistryError::NotFound(_))
    ));
}

#[tokio::test]
async fn remove_drops_record_and_executor() {
    let shelf = Arc::new(MemoryShelf::new());
    let registry = ActivationRegistry::new(Arc::clone(&shelf) as Arc<dyn ShelfStore>, Arc::new(StubFactory::new()));
    let id = registry.install("ark:/a", echo_source()).await.unwrap();
    registry.activate(&id).await.unwrap();

    let removed = registry.remove(&id).await.unwrap();

    assert_eq!(removed.status, ActivationStatus::Activated);
    assert_eq!(
        registry.lookup_by_hash(&id).unwrap_err().reason,
        NotFoundReason::Unknown
    );
    assert_eq!(shelf.stored(), Snapshot::new());
    assert!(matches!(
        registry.remove(&id).await,
        Err(RegistryError::NotFound(_))
    ));
}

#[tokio::test]
async fn lookups_see_old_state_until_activation_completes() {
    let factory = Arc::new(StubFactory::with_build_delay(Duration::from_millis(200)));
    let registry = Arc::new(ActivationRegistry::new(Arc::new(MemoryShelf::new()), factory));
    let id = registry.install("ark:/slow", echo_source()).await.unwrap();

    let activation = {
        let registry = Arc::clone(&registry);
        let id = id.clone();
        tokio::spawn(async move { registry.activate(&id).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(
        registry.lookup_by_hash(&id).unwrap_err().reason,
        NotFoundReason::Deactivated
    );
    assert_eq!(registry.status(&id), Some(ActivationStatus::Deactivated));

    activation.await.unwrap().unwrap();
    assert!(registry.lookup_by_hash(&id).is_ok());
}

#[tokio::test]
async fn reinstall_replaces_source_of_deactivated_record() {
    let shelf = Arc::new(MemoryShelf::new());
    let registry = ActivationRegistry::new(Arc::clone(&shelf) as Arc<dyn ShelfStore>, Arc::new(StubFactory::new()));

    let first = registry.install("ark:/a", broken_source()).await.unwrap();
    let second = registry.install("ark:/a", echo_source()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(registry.len(), 1);
    registry.activate(&second).await.unwrap();
    assert!(registry.lookup_by_uri("ark:/a").is_ok());
}
