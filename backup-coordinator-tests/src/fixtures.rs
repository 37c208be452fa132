//! Test fixtures and sample data
//!
//! Provides configuration templates and pre-built specs for testing.

use backup_coordinator::config::{BackupPolicy, ClusterConfig, SidecarSettings};
use backup_coordinator::workload::{BaseSpecFactory, DefaultSpecFactory, WorkloadSpec};

/// Minimal valid config, no storage
pub fn minimal_config_toml() -> &'static str {
    r#"
[cluster]
name = "target"

[backup]
storage_type = "none"
"#
}

/// Persistent volume storage seeded from another cluster
pub fn pv_restore_config_toml() -> &'static str {
    r#"
[cluster]
name = "target"
namespace = "prod"
pv_provisioner = "kubernetes.io/gce-pd"

[backup]
storage_type = "persistent_volume"
volume_size_mb = 1024
max_backups = 5

[restore]
backup_cluster_name = "source"
"#
}

/// Object store storage with every optional field set
pub fn object_store_config_toml() -> &'static str {
    r#"
[cluster]
name = "target"
namespace = "prod"

[cluster.object_store]
bucket = "cluster-backups"
credentials_secret = "store-creds"
config_map = "store-config"

[backup]
storage_type = "object_store"
backup_interval_seconds = 600
cleanup_backups_on_delete = true

[sidecar]
image = "registry.local/backup-sidecar:2.1"
cpu_millis = 200
memory_mb = 256

[logging]
level = "debug"
max_files = 3
"#
}

/// Cluster context used by fixture specs
pub fn sample_cluster() -> ClusterConfig {
    ClusterConfig {
        name: "sample".to_string(),
        namespace: "default".to_string(),
        pv_provisioner: None,
        object_store: None,
        sidecar: SidecarSettings {
            image: "backup-sidecar:test".to_string(),
            cpu_millis: 100,
            memory_mb: 128,
        },
    }
}

/// Undecorated base spec for [`sample_cluster`]
pub fn sample_base_spec() -> WorkloadSpec {
    DefaultSpecFactory::new()
        .make_base_spec(&sample_cluster(), &BackupPolicy::default())
        .expect("default base spec")
}
