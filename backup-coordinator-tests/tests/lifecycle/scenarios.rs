//! End-to-end scenarios over mocked collaborators

use backup_coordinator::workload::composer::{BACKUP_VOLUME, CREDENTIALS_VOLUME};
use backup_coordinator::workload::VolumeSource;
use rstest::rstest;
use test_utils::{
    ClusterConfigBuilder, ClientCall, MockStorageBackends, MockWorkloadClient, ResultAssertions,
    StorageType, TestContext,
};

#[test]
fn test_object_store_new_cluster() {
    let ctx = TestContext::new();
    let setup = ClusterConfigBuilder::new("target").object_store("backups").build();

    let mut coordinator = ctx.coordinator(&setup).assert_ok();
    assert_eq!(coordinator.storage_type(), Some(StorageType::ObjectStore));
    coordinator.setup().assert_ok();

    let specs = ctx.client.created_specs();
    assert_eq!(specs.len(), 1);
    assert!(specs[0].volume(CREDENTIALS_VOLUME).is_some());
    assert_eq!(specs[0].env_value("BACKUP_S3_BUCKET"), Some("backups"));
    assert!(ctx.backends.clone_calls().is_empty());
}

#[test]
fn test_persistent_volume_restore_from_other_cluster() {
    let ctx = TestContext::new();
    let setup = ClusterConfigBuilder::new("target")
        .persistent_volume()
        .restore_from("source")
        .build();

    let mut coordinator = ctx.coordinator(&setup).assert_ok();
    coordinator.setup().assert_ok();

    assert_eq!(
        ctx.events(),
        vec![
            "construct:persistent_volume".to_string(),
            "clone:source".to_string(),
            "create:target-backup-sidecar".to_string(),
        ]
    );
}

#[test]
fn test_persistent_volume_restore_clone_failure() {
    let ctx = TestContext::with_mocks(
        MockStorageBackends::new().with_failing_clone(),
        MockWorkloadClient::new(),
    );
    let setup = ClusterConfigBuilder::new("target")
        .persistent_volume()
        .restore_from("source")
        .build();

    let mut coordinator = ctx.coordinator(&setup).assert_ok();
    coordinator.setup().assert_err_contains("source");

    assert!(!ctx
        .client
        .get_calls()
        .iter()
        .any(|c| matches!(c, ClientCall::Create { .. })));
}

#[test]
fn test_no_storage_lifecycle() {
    let ctx = TestContext::new();
    let setup = ClusterConfigBuilder::new("target").no_storage().build();

    let mut coordinator = ctx.coordinator(&setup).assert_ok();
    coordinator.setup().assert_ok();
    coordinator.cleanup().assert_ok();

    assert!(!ctx.backends.constructed());
    assert_eq!(ctx.backends.delete_count(), 0);

    let specs = ctx.client.created_specs();
    assert_eq!(specs.len(), 1);
    assert_eq!(specs[0].volumes.len(), 1);
    assert_eq!(specs[0].volume(BACKUP_VOLUME).unwrap().source, VolumeSource::EmptyDir);
    assert!(specs[0].env.is_empty());
}

#[rstest]
#[case(StorageType::None)]
#[case(StorageType::PersistentVolume)]
#[case(StorageType::ObjectStore)]
fn test_full_lifecycle_leaves_nothing_behind(#[case] storage_type: StorageType) {
    let ctx = TestContext::new();
    let setup = ClusterConfigBuilder::new("target")
        .namespace("prod")
        .storage(storage_type)
        .build();

    let mut coordinator = ctx.coordinator(&setup).assert_ok();
    coordinator.setup().assert_ok();
    assert_eq!(ctx.client.running_count(), 1);

    coordinator.cleanup().assert_ok();
    assert_eq!(ctx.client.running_count(), 0);
    assert_eq!(coordinator.storage_type(), None);
}
