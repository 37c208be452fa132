//! Tests for `cleanup()`: idempotence and best-effort deletion

use test_utils::{
    ClusterConfigBuilder, CoordinatorError, MockStorageBackends, MockWorkloadClient, Phase,
    ResultAssertions, TestContext,
};

#[test]
fn test_cleanup_without_setup_is_ok() {
    let ctx = TestContext::new();
    let setup = ClusterConfigBuilder::new("target").persistent_volume().build();

    let mut coordinator = ctx.coordinator(&setup).assert_ok();
    coordinator.cleanup().assert_ok();

    assert_eq!(ctx.client.delete_count(), 1);
    assert_eq!(ctx.backends.delete_count(), 1);
    assert_eq!(coordinator.phase(), Phase::TornDown);
}

#[test]
fn test_cleanup_twice_is_ok() {
    let ctx = TestContext::new();
    let setup = ClusterConfigBuilder::new("target").object_store("backups").build();

    let mut coordinator = ctx.coordinator(&setup).assert_ok();
    coordinator.setup().assert_ok();
    coordinator.cleanup().assert_ok();
    coordinator.cleanup().assert_ok();

    assert_eq!(ctx.client.delete_count(), 2);
    assert_eq!(ctx.client.running_count(), 0);
}

#[test]
fn test_storage_deleted_after_workload_failure() {
    let ctx = TestContext::with_mocks(
        MockStorageBackends::new(),
        MockWorkloadClient::new().with_failing_delete(),
    );
    let setup = ClusterConfigBuilder::new("target").persistent_volume().build();

    let mut coordinator = ctx.coordinator(&setup).assert_ok();
    let err = coordinator.cleanup().unwrap_err();

    assert!(matches!(err, CoordinatorError::DeleteSidecar(_)));
    assert_eq!(ctx.backends.delete_count(), 1);
}

#[test]
fn test_storage_failure_reported() {
    let ctx = TestContext::with_mocks(
        MockStorageBackends::new().with_failing_delete(),
        MockWorkloadClient::new(),
    );
    let setup = ClusterConfigBuilder::new("target").persistent_volume().build();

    let mut coordinator = ctx.coordinator(&setup).assert_ok();
    coordinator.setup().assert_ok();
    coordinator
        .cleanup()
        .assert_err_contains("Failed to delete backup storage");

    assert_eq!(ctx.client.running_count(), 0);
}

#[test]
fn test_both_failures_reported_together() {
    let ctx = TestContext::with_mocks(
        MockStorageBackends::new().with_failing_delete(),
        MockWorkloadClient::new().with_failing_delete(),
    );
    let setup = ClusterConfigBuilder::new("target").object_store("backups").build();

    let mut coordinator = ctx.coordinator(&setup).assert_ok();
    let message = coordinator.cleanup().unwrap_err().to_string();

    assert!(message.contains("replica set and service"));
    assert!(message.contains("Mock storage delete failure"));
}

#[test]
fn test_failed_storage_delete_can_be_retried() {
    let ctx = TestContext::with_mocks(
        MockStorageBackends::new().with_failing_delete(),
        MockWorkloadClient::new(),
    );
    let setup = ClusterConfigBuilder::new("target").persistent_volume().build();

    let mut coordinator = ctx.coordinator(&setup).assert_ok();
    assert!(coordinator.cleanup().is_err());
    assert!(coordinator.cleanup().is_err());

    assert_eq!(ctx.backends.delete_count(), 2);
}

#[test]
fn test_workload_deleted_before_storage() {
    let ctx = TestContext::new();
    let setup = ClusterConfigBuilder::new("target").persistent_volume().build();

    let mut coordinator = ctx.coordinator(&setup).assert_ok();
    coordinator.setup().assert_ok();
    coordinator.cleanup().assert_ok();

    let workload_at = ctx.event_index("delete-workload").unwrap();
    let storage_at = ctx.event_index("delete-storage").unwrap();
    assert!(workload_at < storage_at);
}
