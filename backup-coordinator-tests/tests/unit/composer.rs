//! Unit tests for sidecar spec composition

use backup_coordinator::workload::composer::{
    decorate, with_scratch_dir, BACKUP_DIR, BACKUP_VOLUME, CREDENTIALS_VOLUME, STORE_CONFIG_VOLUME,
};
use backup_coordinator::workload::{compose_sidecar_spec, VolumeSource};
use rstest::rstest;
use test_utils::{
    sample_base_spec, sample_cluster, ClusterConfigBuilder, MockSpecFactory, StorageType,
};

#[rstest]
#[case(StorageType::None, 1, 0)]
#[case(StorageType::PersistentVolume, 1, 0)]
#[case(StorageType::ObjectStore, 2, 4)]
fn test_exactly_one_decoration(
    #[case] storage_type: StorageType,
    #[case] volumes: usize,
    #[case] env: usize,
) {
    let setup = ClusterConfigBuilder::new("target").storage(storage_type).build();
    let factory = MockSpecFactory::new();

    let spec = compose_sidecar_spec(&factory, &setup.backup, &setup.cluster).unwrap();

    assert_eq!(factory.call_count(), 1);
    assert_eq!(spec.volumes.len(), volumes);
    assert_eq!(spec.mounts.len(), volumes);
    assert_eq!(spec.env.len(), env);
}

#[test]
fn test_object_store_spec_carries_credentials() {
    let setup = ClusterConfigBuilder::new("target")
        .namespace("prod")
        .object_store("cluster-backups")
        .build();

    let spec =
        compose_sidecar_spec(&MockSpecFactory::new(), &setup.backup, &setup.cluster).unwrap();

    assert_eq!(
        spec.volume(CREDENTIALS_VOLUME).unwrap().source,
        VolumeSource::Secret {
            secret_name: "aws-credentials".to_string()
        }
    );
    assert_eq!(
        spec.volume(STORE_CONFIG_VOLUME).unwrap().source,
        VolumeSource::ConfigMap {
            name: "aws-config".to_string()
        }
    );
    assert_eq!(spec.env_value("BACKUP_S3_BUCKET"), Some("cluster-backups"));
    assert_eq!(spec.env_value("BACKUP_S3_PREFIX"), Some("prod/target"));
}

#[test]
fn test_base_spec_failure_propagates() {
    let setup = ClusterConfigBuilder::new("target").persistent_volume().build();
    let factory = MockSpecFactory::new().with_failure();

    let err = compose_sidecar_spec(&factory, &setup.backup, &setup.cluster).unwrap_err();
    assert!(format!("{:#}", err).contains("Mock base spec failure"));
}

#[test]
fn test_decoration_keeps_base_fields() {
    let base = sample_base_spec();
    let spec = decorate(base.clone(), StorageType::PersistentVolume, &sample_cluster()).unwrap();

    assert_eq!(spec.name, base.name);
    assert_eq!(spec.args, base.args);
    assert_eq!(spec.resources, base.resources);
    assert_eq!(spec.labels, base.labels);
}

#[test]
fn test_scratch_mount_is_ephemeral() {
    let spec = with_scratch_dir(sample_base_spec());

    assert_eq!(spec.volume(BACKUP_VOLUME).unwrap().source, VolumeSource::EmptyDir);
    assert_eq!(spec.mounts[0].mount_path, BACKUP_DIR);
}

#[test]
fn test_spec_serializes_to_json() {
    let spec = with_scratch_dir(sample_base_spec());
    let json = serde_json::to_value(&spec).unwrap();

    assert_eq!(json["name"], "sample-backup-sidecar");
    assert_eq!(json["restart_policy"], "Always");
    assert_eq!(json["volumes"][0]["source"], "empty_dir");
}

#[test]
fn test_retention_reaches_sidecar_args() {
    let setup = ClusterConfigBuilder::new("target")
        .persistent_volume()
        .max_backups(12)
        .build();

    let spec =
        compose_sidecar_spec(&MockSpecFactory::new(), &setup.backup, &setup.cluster).unwrap();

    assert!(spec.args.contains(&"--max-backups=12".to_string()));
    assert!(spec.args.contains(&"--cluster=target".to_string()));
}
