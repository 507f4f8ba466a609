mod common;

use common::{cvm_syncer, init_tracing, instance, seed_cloud};
use hcm_sync::testing::{MemoryHandler, MemoryInventory, MemoryPager, Operation};
use hcm_sync::{Pager, SyncErrorKind, Syncer};

#[tokio::test]
async fn test_second_full_sync_is_empty() {
    init_tracing();
    let inventory = MemoryInventory::new();
    seed_cloud(&inventory, 23);
    inventory.put_target("legacy-1", instance("ins-999", "retired", "STOPPED"));

    let mut syncer = cvm_syncer(&inventory, 5);
    let first = syncer.all_pages().await.unwrap();
    assert_eq!(first.create_ids.len(), 23);
    assert_eq!(first.delete_ids, vec!["legacy-1".to_string()]);
    assert!(inventory.is_converged());

    let second = syncer.all_pages().await.unwrap();
    assert!(second.is_empty(), "unexpected changes: {}", second.summary());
}

#[tokio::test]
async fn test_follows_cloud_changes_between_runs() {
    init_tracing();
    let inventory = MemoryInventory::new();
    seed_cloud(&inventory, 10);
    cvm_syncer(&inventory, 4).all_pages().await.unwrap();

    // ins-003 terminated, ins-004 stopped, one new instance launched
    inventory.remove_source("ins-003");
    inventory.put_source(instance("ins-004", "web-004", "STOPPED"));
    inventory.put_source(instance("ins-100", "batch-100", "PENDING"));

    let stored = |uuid: &str| {
        inventory
            .target()
            .into_iter()
            .find(|t| t.uuid == uuid)
            .map(|t| t.local_id)
    };
    let terminated = stored("ins-003").unwrap();
    let stopped = stored("ins-004").unwrap();

    let result = cvm_syncer(&inventory, 4).all_pages().await.unwrap();

    assert_eq!(result.delete_ids, vec![terminated]);
    assert_eq!(result.update_ids, vec![stopped]);
    assert_eq!(result.create_ids.len(), 1);
    assert!(inventory.is_converged());
    assert_eq!(inventory.target().len(), 10);
}

#[tokio::test]
async fn test_rerun_after_failure_converges() {
    init_tracing();
    let inventory = MemoryInventory::new();
    seed_cloud(&inventory, 8);
    inventory.fail_on(Operation::Create);

    let err = cvm_syncer(&inventory, 3).all_pages().await.unwrap_err();
    assert_eq!(err.kind(), SyncErrorKind::MutateFailed);
    assert!(inventory.target().is_empty());

    inventory.recover(Operation::Create);
    let result = cvm_syncer(&inventory, 3).all_pages().await.unwrap();

    assert_eq!(result.create_ids.len(), 8);
    assert!(inventory.is_converged());
}

#[tokio::test]
async fn test_resource_types_sync_independently() {
    init_tracing();
    let instances = MemoryInventory::new();
    let disks = MemoryInventory::new();
    seed_cloud(&instances, 6);
    disks.put_source(instance("disk-1", "system", "ATTACHED"));
    disks.put_target("D9", instance("disk-9", "data", "ATTACHED"));

    let mut cvm = cvm_syncer(&instances, 2);
    let mut cbs = Syncer::new(
        MemoryHandler::new("tcloud-cbs", disks.clone()),
        MemoryPager::new(disks.clone(), 2),
    );

    let (cvm_result, cbs_result) = tokio::join!(cvm.all_pages(), cbs.all_pages());

    assert_eq!(cvm_result.unwrap().create_ids.len(), 6);
    let cbs_result = cbs_result.unwrap();
    assert_eq!(cbs_result.create_ids.len(), 1);
    assert_eq!(cbs_result.delete_ids, vec!["D9".to_string()]);
    assert!(instances.is_converged());
    assert!(disks.is_converged());
}

#[tokio::test]
async fn test_batch_sync_of_specific_resources() {
    init_tracing();
    let inventory = MemoryInventory::new();
    seed_cloud(&inventory, 5);
    inventory.put_target("T1", instance("ins-001", "web-001", "STOPPED"));
    inventory.put_target("T4", instance("ins-004", "web-004", "RUNNING"));

    let syncer = cvm_syncer(&inventory, 10);
    let param = syncer
        .pager()
        .build_param(&["ins-001".to_string(), "ins-002".to_string()]);
    let result = syncer.batch_or_all(&param).await.unwrap();

    assert_eq!(result.update_ids, vec!["T1".to_string()]);
    assert_eq!(result.create_ids.len(), 1);
    assert!(result.delete_ids.is_empty());
    // untouched by the batch
    assert_eq!(inventory.target().len(), 3);
    assert!(!inventory.is_converged());
}
