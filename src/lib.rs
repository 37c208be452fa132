//! Backup Coordinator Library
//!
//! Per-cluster backup lifecycle: picks a storage backend, optionally seeds it
//! from another cluster's backups, runs the backup sidecar, and tears both
//! down again.

pub mod config;
pub mod managers;
pub mod storage;
pub mod workload;

// Re-export commonly used types
pub use config::{load_config, BackupPolicy, ClusterConfig, Config, RestorePolicy};
pub use managers::coordinator::{
    BackupCoordinator, Collaborators, CoordinatorError, Phase, RestoreAction,
};
pub use managers::logging::{init_console_logging, init_logging, LogGuard, LoggingConfig};
pub use storage::{StorageBackends, StorageHandle, StorageType};
pub use workload::{BaseSpecFactory, ClientError, WorkloadClient, WorkloadSpec};
