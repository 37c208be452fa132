//! Fluent API for building test cluster configurations
//!
//! Provides a builder pattern for creating cluster context and policies with
//! sensible defaults.

use backup_coordinator::config::{
    BackupPolicy, BackupSection, ClusterConfig, ClusterSection, Config, LogSection,
    ObjectStoreContext, RestorePolicy, RestoreSection, SidecarConfig, SidecarSettings,
};
use backup_coordinator::StorageType;
use std::path::Path;
use std::sync::Arc;

/// Everything a coordinator is constructed from, minus the collaborators
#[derive(Debug, Clone)]
pub struct ClusterSetup {
    pub cluster: Arc<ClusterConfig>,
    pub backup: BackupPolicy,
    pub restore: Option<RestorePolicy>,
    pub is_new_cluster: bool,
}

/// Builder for creating test cluster configurations
pub struct ClusterConfigBuilder {
    cluster: ClusterConfig,
    backup: BackupPolicy,
    restore: Option<RestorePolicy>,
    is_new_cluster: bool,
}

impl ClusterConfigBuilder {
    /// New cluster with no storage in the default namespace
    pub fn new(name: &str) -> Self {
        Self {
            cluster: ClusterConfig {
                name: name.to_string(),
                namespace: "default".to_string(),
                pv_provisioner: None,
                object_store: None,
                sidecar: SidecarSettings {
                    image: "backup-sidecar:test".to_string(),
                    cpu_millis: 100,
                    memory_mb: 128,
                },
            },
            backup: BackupPolicy::default(),
            restore: None,
            is_new_cluster: true,
        }
    }

    pub fn namespace(mut self, namespace: &str) -> Self {
        self.cluster.namespace = namespace.to_string();
        self
    }

    /// Back up to a provisioned persistent volume
    pub fn persistent_volume(mut self) -> Self {
        self.cluster.pv_provisioner = Some("kubernetes.io/gce-pd".to_string());
        self.backup.storage_type = StorageType::PersistentVolume;
        self
    }

    /// Back up to an object store bucket
    pub fn object_store(mut self, bucket: &str) -> Self {
        self.cluster.object_store = Some(ObjectStoreContext {
            bucket: bucket.to_string(),
            credentials_secret: "aws-credentials".to_string(),
            config_map: "aws-config".to_string(),
        });
        self.backup.storage_type = StorageType::ObjectStore;
        self
    }

    /// Keep backups on ephemeral scratch space only
    pub fn no_storage(mut self) -> Self {
        self.backup.storage_type = StorageType::None;
        self
    }

    pub fn storage(self, storage_type: StorageType) -> Self {
        match storage_type {
            StorageType::None => self.no_storage(),
            StorageType::PersistentVolume => self.persistent_volume(),
            StorageType::ObjectStore => self.object_store("backups"),
        }
    }

    pub fn restore_from(mut self, source: &str) -> Self {
        self.restore = Some(RestorePolicy::new(source));
        self
    }

    /// Re-attach to an existing cluster instead of creating a new one
    pub fn existing(mut self) -> Self {
        self.is_new_cluster = false;
        self
    }

    pub fn max_backups(mut self, max_backups: u32) -> Self {
        self.backup.max_backups = max_backups;
        self
    }

    /// Have the backend remove stored backups when the cluster is deleted
    pub fn cleanup_on_delete(mut self) -> Self {
        self.backup.cleanup_backups_on_delete = true;
        self
    }

    pub fn sidecar_resources(mut self, cpu_millis: u32, memory_mb: u32) -> Self {
        self.cluster.sidecar.cpu_millis = cpu_millis;
        self.cluster.sidecar.memory_mb = memory_mb;
        self
    }

    pub fn build(self) -> ClusterSetup {
        ClusterSetup {
            cluster: Arc::new(self.cluster),
            backup: self.backup,
            restore: self.restore,
            is_new_cluster: self.is_new_cluster,
        }
    }

    /// Render as a configuration file, logging into `log_dir`
    pub fn to_toml(&self, log_dir: &Path) -> String {
        let config = Config {
            cluster: ClusterSection {
                name: self.cluster.name.clone(),
                namespace: self.cluster.namespace.clone(),
                pv_provisioner: self.cluster.pv_provisioner.clone(),
                object_store: self.cluster.object_store.clone(),
            },
            backup: BackupSection {
                storage_type: self.backup.storage_type,
                backup_interval_seconds: self.backup.backup_interval_seconds,
                max_backups: self.backup.max_backups,
                volume_size_mb: self.backup.volume_size_mb,
                cleanup_backups_on_delete: self.backup.cleanup_backups_on_delete,
            },
            restore: self.restore.as_ref().map(|r| RestoreSection {
                backup_cluster_name: r.backup_cluster_name.clone(),
            }),
            sidecar: SidecarConfig {
                image: self.cluster.sidecar.image.clone(),
                cpu_millis: self.cluster.sidecar.cpu_millis,
                memory_mb: self.cluster.sidecar.memory_mb,
            },
            logging: LogSection {
                directory: log_dir.to_path_buf(),
                level: "debug".to_string(),
                max_files: 10,
            },
        };
        toml::to_string_pretty(&config).expect("Failed to serialize test config")
    }
}
