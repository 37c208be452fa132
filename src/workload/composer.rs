//! Sidecar spec composition
//!
//! The base spec is backend-agnostic; exactly one storage decoration is
//! applied on top of it, chosen by the policy's storage type.

use super::spec::{ResourceLimits, RestartPolicy, VolumeSource, WorkloadSpec};
use crate::config::{BackupPolicy, ClusterConfig, ObjectStoreContext};
use crate::storage::StorageType;
use anyhow::{Context, Result};
use std::collections::BTreeMap;

/// Directory inside the sidecar where backups are written
pub const BACKUP_DIR: &str = "/var/cluster-backup";

/// Name of the volume carrying backup data
pub const BACKUP_VOLUME: &str = "backup-storage";

pub const CREDENTIALS_VOLUME: &str = "object-store-credentials";
pub const CREDENTIALS_DIR: &str = "/root/.aws/credentials";
pub const STORE_CONFIG_VOLUME: &str = "object-store-config";
pub const STORE_CONFIG_DIR: &str = "/root/.aws/config";

/// Builds the backend-agnostic part of the sidecar spec
pub trait BaseSpecFactory: Send + Sync {
    fn make_base_spec(
        &self,
        cluster: &ClusterConfig,
        policy: &BackupPolicy,
    ) -> Result<WorkloadSpec>;
}

/// Name of the sidecar workload for a cluster
pub fn sidecar_name(cluster_name: &str) -> String {
    format!("{}-backup-sidecar", cluster_name)
}

/// Name of the volume claim provisioned for a cluster's backups
pub fn backup_claim_name(cluster_name: &str) -> String {
    format!("{}-backup-pvc", cluster_name)
}

/// Default base spec: one container running the backup sidecar image
#[derive(Debug, Clone, Default)]
pub struct DefaultSpecFactory;

impl DefaultSpecFactory {
    pub fn new() -> Self {
        Self
    }
}

impl BaseSpecFactory for DefaultSpecFactory {
    fn make_base_spec(
        &self,
        cluster: &ClusterConfig,
        policy: &BackupPolicy,
    ) -> Result<WorkloadSpec> {
        if policy.backup_interval_seconds == 0 {
            anyhow::bail!(
                "Invalid backup interval for cluster '{}': must be greater than zero",
                cluster.name
            );
        }

        let mut labels = BTreeMap::new();
        labels.insert("app".to_string(), "backup-sidecar".to_string());
        labels.insert("cluster".to_string(), cluster.name.clone());

        Ok(WorkloadSpec {
            name: sidecar_name(&cluster.name),
            restart_policy: RestartPolicy::Always,
            image: cluster.sidecar.image.clone(),
            args: vec![
                format!("--cluster={}", cluster.name),
                format!("--backup-dir={}", BACKUP_DIR),
                format!("--max-backups={}", policy.max_backups),
                format!("--backup-interval={}s", policy.backup_interval_seconds),
            ],
            resources: ResourceLimits {
                cpu_millis: cluster.sidecar.cpu_millis,
                memory_mb: cluster.sidecar.memory_mb,
            },
            labels,
            env: vec![],
            volumes: vec![],
            mounts: vec![],
        })
    }
}

/// Build the base spec and decorate it for the policy's storage type
pub fn compose_sidecar_spec(
    factory: &dyn BaseSpecFactory,
    policy: &BackupPolicy,
    cluster: &ClusterConfig,
) -> Result<WorkloadSpec> {
    let base = factory
        .make_base_spec(cluster, policy)
        .context("Failed to build base sidecar spec")?;
    decorate(base, policy.storage_type, cluster)
}

/// Apply the storage decoration for `storage_type`
pub fn decorate(
    spec: WorkloadSpec,
    storage_type: StorageType,
    cluster: &ClusterConfig,
) -> Result<WorkloadSpec> {
    let spec = match storage_type {
        StorageType::PersistentVolume => with_persistent_volume(spec, &cluster.name),
        StorageType::ObjectStore => {
            let store = cluster
                .object_store
                .as_ref()
                .context("object store sidecar requires an object store context")?;
            with_object_store(spec, store, cluster)
        }
        StorageType::None => with_scratch_dir(spec),
    };
    Ok(spec)
}

/// Mount the cluster's provisioned volume claim
pub fn with_persistent_volume(spec: WorkloadSpec, cluster_name: &str) -> WorkloadSpec {
    spec.with_volume(
        BACKUP_VOLUME,
        VolumeSource::PersistentClaim {
            claim_name: backup_claim_name(cluster_name),
        },
        BACKUP_DIR,
    )
}

/// Inject object store credentials and location
pub fn with_object_store(
    spec: WorkloadSpec,
    store: &ObjectStoreContext,
    cluster: &ClusterConfig,
) -> WorkloadSpec {
    spec.with_volume(
        CREDENTIALS_VOLUME,
        VolumeSource::Secret {
            secret_name: store.credentials_secret.clone(),
        },
        CREDENTIALS_DIR,
    )
    .with_volume(
        STORE_CONFIG_VOLUME,
        VolumeSource::ConfigMap {
            name: store.config_map.clone(),
        },
        STORE_CONFIG_DIR,
    )
    .with_env(
        "AWS_SHARED_CREDENTIALS_FILE",
        format!("{}/credentials", CREDENTIALS_DIR),
    )
    .with_env("AWS_CONFIG_FILE", format!("{}/config", STORE_CONFIG_DIR))
    .with_env("BACKUP_S3_BUCKET", store.bucket.clone())
    .with_env(
        "BACKUP_S3_PREFIX",
        format!("{}/{}", cluster.namespace, cluster.name),
    )
}

/// Mount non-persistent scratch space for backups
pub fn with_scratch_dir(spec: WorkloadSpec) -> WorkloadSpec {
    spec.with_volume(BACKUP_VOLUME, VolumeSource::EmptyDir, BACKUP_DIR)
}

/// Mock implementation for testing
/// Available for use in external test crates
#[allow(dead_code)]
pub mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Base spec factory wrapping [`DefaultSpecFactory`] that counts calls
    #[derive(Clone, Default)]
    pub struct MockSpecFactory {
        pub calls: Arc<Mutex<usize>>,
        /// Number of leading calls that fail
        failing_calls: usize,
    }

    impl MockSpecFactory {
        pub fn new() -> Self {
            Self::default()
        }

        /// Configure every call to fail
        pub fn with_failure(self) -> Self {
            self.with_failures(usize::MAX)
        }

        /// Configure the first `count` calls to fail
        pub fn with_failures(mut self, count: usize) -> Self {
            self.failing_calls = count;
            self
        }

        pub fn call_count(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    impl BaseSpecFactory for MockSpecFactory {
        fn make_base_spec(
            &self,
            cluster: &ClusterConfig,
            policy: &BackupPolicy,
        ) -> Result<WorkloadSpec> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                *calls += 1;
                *calls
            };
            if call <= self.failing_calls {
                anyhow::bail!("Mock base spec failure for {}", cluster.name);
            }
            DefaultSpecFactory.make_base_spec(cluster, policy)
        }
    }
}
