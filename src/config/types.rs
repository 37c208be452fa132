use crate::storage::StorageType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub cluster: ClusterSection,
    pub backup: BackupSection,
    #[serde(default)]
    pub restore: Option<RestoreSection>,
    #[serde(default)]
    pub sidecar: SidecarConfig,
    #[serde(default)]
    pub logging: LogSection,
}

/// Identity and backend context of the managed cluster
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClusterSection {
    pub name: String,

    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Volume provisioner used by the persistent volume backend
    #[serde(default)]
    pub pv_provisioner: Option<String>,

    /// Object store context used by the object store backend
    #[serde(default)]
    pub object_store: Option<ObjectStoreContext>,
}

/// Connection and credential context for the object store backend
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ObjectStoreContext {
    pub bucket: String,

    /// Secret holding the store credentials file
    #[serde(default = "default_credentials_secret")]
    pub credentials_secret: String,

    /// Config map holding the store client configuration
    #[serde(default = "default_config_map")]
    pub config_map: String,
}

/// Backup policy as written in the configuration file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackupSection {
    #[serde(default)]
    pub storage_type: StorageType,

    #[serde(default = "default_backup_interval")]
    pub backup_interval_seconds: u64,

    /// Zero keeps every backup
    #[serde(default)]
    pub max_backups: u32,

    #[serde(default = "default_volume_size_mb")]
    pub volume_size_mb: u64,

    #[serde(default)]
    pub cleanup_backups_on_delete: bool,
}

/// Restore policy as written in the configuration file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RestoreSection {
    pub backup_cluster_name: String,
}

/// Settings for the base sidecar workload
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SidecarConfig {
    #[serde(default = "default_sidecar_image")]
    pub image: String,

    #[serde(default = "default_cpu_millis")]
    pub cpu_millis: u32,

    #[serde(default = "default_memory_mb")]
    pub memory_mb: u32,
}

impl Default for SidecarConfig {
    fn default() -> Self {
        Self {
            image: default_sidecar_image(),
            cpu_millis: default_cpu_millis(),
            memory_mb: default_memory_mb(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogSection {
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_max_files")]
    pub max_files: u32,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
            level: default_log_level(),
            max_files: default_log_max_files(),
        }
    }
}

/// Immutable identity and context of one managed cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterConfig {
    pub name: String,
    pub namespace: String,
    pub pv_provisioner: Option<String>,
    pub object_store: Option<ObjectStoreContext>,
    pub sidecar: SidecarSettings,
}

/// Resolved sidecar settings carried with the cluster context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidecarSettings {
    pub image: String,
    pub cpu_millis: u32,
    pub memory_mb: u32,
}

/// Desired storage type plus backend parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupPolicy {
    pub storage_type: StorageType,
    pub backup_interval_seconds: u64,
    pub max_backups: u32,
    pub volume_size_mb: u64,
    pub cleanup_backups_on_delete: bool,
}

impl Default for BackupPolicy {
    fn default() -> Self {
        Self {
            storage_type: StorageType::None,
            backup_interval_seconds: default_backup_interval(),
            max_backups: 0,
            volume_size_mb: default_volume_size_mb(),
            cleanup_backups_on_delete: false,
        }
    }
}

/// Names the cluster whose backup seeds this cluster's storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestorePolicy {
    pub backup_cluster_name: String,
}

impl RestorePolicy {
    pub fn new(backup_cluster_name: impl Into<String>) -> Self {
        Self {
            backup_cluster_name: backup_cluster_name.into(),
        }
    }
}

impl Config {
    /// Runtime cluster context
    pub fn cluster_config(&self) -> ClusterConfig {
        ClusterConfig {
            name: self.cluster.name.clone(),
            namespace: self.cluster.namespace.clone(),
            pv_provisioner: self.cluster.pv_provisioner.clone(),
            object_store: self.cluster.object_store.clone(),
            sidecar: SidecarSettings {
                image: self.sidecar.image.clone(),
                cpu_millis: self.sidecar.cpu_millis,
                memory_mb: self.sidecar.memory_mb,
            },
        }
    }

    pub fn backup_policy(&self) -> BackupPolicy {
        BackupPolicy {
            storage_type: self.backup.storage_type,
            backup_interval_seconds: self.backup.backup_interval_seconds,
            max_backups: self.backup.max_backups,
            volume_size_mb: self.backup.volume_size_mb,
            cleanup_backups_on_delete: self.backup.cleanup_backups_on_delete,
        }
    }

    pub fn restore_policy(&self) -> Option<RestorePolicy> {
        self.restore
            .as_ref()
            .map(|r| RestorePolicy::new(r.backup_cluster_name.clone()))
    }
}

// Default value functions

fn default_namespace() -> String { "default".to_string() }
fn default_credentials_secret() -> String { "aws-credentials".to_string() }
fn default_config_map() -> String { "aws-config".to_string() }
fn default_backup_interval() -> u64 { 1800 }
fn default_volume_size_mb() -> u64 { 512 }
fn default_sidecar_image() -> String { "backup-sidecar:latest".to_string() }
fn default_cpu_millis() -> u32 { 100 }
fn default_memory_mb() -> u32 { 128 }
fn default_log_directory() -> PathBuf { PathBuf::from("~/logs") }
fn default_log_level() -> String { "info".to_string() }
fn default_log_max_files() -> u32 { 10 }
