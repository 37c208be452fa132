//! Tests for `setup()`: restore decisions, clone ordering, sidecar submission

use backup_coordinator::workload::DefaultSpecFactory;
use std::sync::Arc;
use test_utils::{
    BackupCoordinator, ClientCall, ClusterConfigBuilder, Collaborators, CoordinatorError,
    FlakyClient, MockSpecFactory, MockStorageBackends, MockWorkloadClient, Phase,
    ResultAssertions, RestoreAction, StorageCall, StorageType, TestContext,
};

#[test]
fn test_self_restore_never_clones() {
    let ctx = TestContext::new();
    let setup = ClusterConfigBuilder::new("target")
        .persistent_volume()
        .restore_from("target")
        .build();

    let mut coordinator = ctx.coordinator(&setup).assert_ok();
    assert_eq!(coordinator.restore_action(), RestoreAction::ReuseOwnStorage);
    coordinator.setup().assert_ok();

    assert!(ctx.backends.clone_calls().is_empty());
    assert_eq!(ctx.client.created_specs().len(), 1);
}

#[test]
fn test_restore_without_storage_is_demoted() {
    let ctx = TestContext::new();
    let setup = ClusterConfigBuilder::new("target")
        .no_storage()
        .restore_from("source")
        .build();

    let mut coordinator = ctx.coordinator(&setup).assert_ok();
    coordinator.setup().assert_ok();

    assert!(!ctx.backends.constructed());
    assert!(ctx.backends.clone_calls().is_empty());
    assert_eq!(coordinator.phase(), Phase::SidecarRunning);
}

#[test]
fn test_clone_runs_before_sidecar() {
    let ctx = TestContext::new();
    let setup = ClusterConfigBuilder::new("target")
        .object_store("backups")
        .restore_from("source")
        .build();

    let mut coordinator = ctx.coordinator(&setup).assert_ok();
    coordinator.setup().assert_ok();

    let clone_at = ctx.event_index("clone:source").expect("clone recorded");
    let create_at = ctx.event_index("create:").expect("create recorded");
    assert!(clone_at < create_at, "events: {:?}", ctx.events());
}

#[test]
fn test_failed_clone_launches_nothing() {
    let ctx = TestContext::with_mocks(
        MockStorageBackends::new().with_failing_clone(),
        MockWorkloadClient::new(),
    );
    let setup = ClusterConfigBuilder::new("target")
        .persistent_volume()
        .restore_from("source")
        .build();

    let mut coordinator = ctx.coordinator(&setup).assert_ok();
    let err = coordinator.setup().unwrap_err();

    assert!(matches!(
        err,
        CoordinatorError::Clone { ref source_cluster, .. } if source_cluster == "source"
    ));
    assert!(ctx.client.get_calls().is_empty());
    assert_eq!(coordinator.phase(), Phase::Restoring);
}

#[test]
fn test_sidecar_failure_is_surfaced() {
    let ctx = TestContext::with_mocks(
        MockStorageBackends::new(),
        MockWorkloadClient::new().with_failing_create(),
    );
    let setup = ClusterConfigBuilder::new("target").persistent_volume().build();

    let mut coordinator = ctx.coordinator(&setup).assert_ok();
    coordinator
        .setup()
        .assert_err_contains("Failed to create backup replica set and service");
    assert_ne!(coordinator.phase(), Phase::SidecarRunning);
}

#[test]
fn test_retry_after_sidecar_failure_does_not_clone_again() {
    let backends = MockStorageBackends::new();
    let inner = MockWorkloadClient::new();
    let collaborators = Collaborators::new(
        Arc::new(backends.clone()),
        Arc::new(FlakyClient::new(inner.clone(), 1)),
        Arc::new(DefaultSpecFactory::new()),
    );
    let setup = ClusterConfigBuilder::new("target")
        .persistent_volume()
        .restore_from("source")
        .build();

    let mut coordinator = BackupCoordinator::new(
        Arc::clone(&setup.cluster),
        setup.backup.clone(),
        setup.restore.clone(),
        &collaborators,
        setup.is_new_cluster,
    )
    .assert_ok();

    assert!(matches!(coordinator.setup(), Err(CoordinatorError::CreateSidecar(_))));
    coordinator.setup().assert_ok();

    assert_eq!(backends.clone_calls(), vec!["source".to_string()]);
    assert_eq!(inner.running_count(), 1);
}

#[test]
fn test_existing_sidecar_is_not_duplicated() {
    let ctx = TestContext::with_mocks(
        MockStorageBackends::new(),
        MockWorkloadClient::new().with_running("target", "default", test_utils::sample_base_spec()),
    );
    let setup = ClusterConfigBuilder::new("target").persistent_volume().existing().build();

    let mut coordinator = ctx.coordinator(&setup).assert_ok();
    coordinator.setup().assert_ok();

    assert_eq!(ctx.client.running_count(), 1);
    assert_eq!(coordinator.phase(), Phase::SidecarRunning);
}

#[test]
fn test_construction_failure_aborts_coordinator() {
    let ctx = TestContext::with_mocks(
        MockStorageBackends::new().with_failing_construct(),
        MockWorkloadClient::new(),
    );
    let setup = ClusterConfigBuilder::new("target").object_store("backups").build();

    let result = ctx.coordinator(&setup);
    assert!(matches!(result, Err(CoordinatorError::Backend(_))));
    assert!(ctx.client.get_calls().is_empty());
}

#[test]
fn test_existing_cluster_attaches_to_prior_state() {
    let ctx = TestContext::new();
    let setup = ClusterConfigBuilder::new("target").persistent_volume().existing().build();

    ctx.coordinator(&setup).assert_ok();

    assert_eq!(
        ctx.backends.get_calls(),
        vec![StorageCall::Construct {
            storage_type: StorageType::PersistentVolume,
            cluster: "target".to_string(),
            expect_prior_state: true,
        }]
    );
}

#[test]
fn test_spec_failure_after_clone_is_retried_without_cloning() {
    let backends = MockStorageBackends::new();
    let client = MockWorkloadClient::new();
    let factory = MockSpecFactory::new().with_failures(1);
    let collaborators = Collaborators::new(
        Arc::new(backends.clone()),
        Arc::new(client.clone()),
        Arc::new(factory.clone()),
    );
    let setup = ClusterConfigBuilder::new("target")
        .persistent_volume()
        .restore_from("source")
        .build();

    let mut coordinator = BackupCoordinator::new(
        Arc::clone(&setup.cluster),
        setup.backup.clone(),
        setup.restore.clone(),
        &collaborators,
        setup.is_new_cluster,
    )
    .assert_ok();

    let err = coordinator.setup().unwrap_err();
    assert!(matches!(err, CoordinatorError::ComposeSidecar(_)));
    assert!(err.to_string().contains("Mock base spec failure"));
    assert!(!client
        .get_calls()
        .iter()
        .any(|c| matches!(c, ClientCall::Create { .. })));
    assert_eq!(coordinator.phase(), Phase::Constructed);

    coordinator.setup().assert_ok();

    assert_eq!(backends.clone_calls(), vec!["source".to_string()]);
    assert_eq!(factory.call_count(), 2);
    assert_eq!(client.created_specs().len(), 1);
    assert_eq!(coordinator.phase(), Phase::SidecarRunning);
}

#[test]
fn test_finished_clone_leaves_restoring_phase() {
    let ctx = TestContext::with_mocks(
        MockStorageBackends::new(),
        MockWorkloadClient::new().with_failing_create(),
    );
    let setup = ClusterConfigBuilder::new("target")
        .object_store("backups")
        .restore_from("source")
        .build();

    let mut coordinator = ctx.coordinator(&setup).assert_ok();
    assert!(matches!(coordinator.setup(), Err(CoordinatorError::CreateSidecar(_))));

    assert_eq!(ctx.backends.clone_calls(), vec!["source".to_string()]);
    assert_eq!(coordinator.phase(), Phase::Constructed);
}
