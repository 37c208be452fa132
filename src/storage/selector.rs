//! Backend selection

use super::{StorageBackends, StorageHandle, StorageTarget, StorageType};
use crate::config::{BackupPolicy, ClusterConfig, RestorePolicy};
use anyhow::{Context, Result};
use tracing::{debug, info};

/// Whether the backend should attach to existing state
///
/// True when re-attaching to an existing cluster, or when the restore source
/// is this cluster itself (its own storage is reused).
pub fn expect_prior_state(
    is_new_cluster: bool,
    restore: Option<&RestorePolicy>,
    cluster_name: &str,
) -> bool {
    if !is_new_cluster {
        return true;
    }
    restore.is_some_and(|r| r.backup_cluster_name == cluster_name)
}

/// Construct the storage handle for a backup policy
///
/// Returns `Ok(None)` for [`StorageType::None`].
pub fn select_storage(
    policy: &BackupPolicy,
    cluster: &ClusterConfig,
    expect_prior_state: bool,
    backends: &dyn StorageBackends,
) -> Result<Option<Box<dyn StorageHandle>>> {
    let target = StorageTarget {
        cluster_name: &cluster.name,
        namespace: &cluster.namespace,
        policy,
        expect_prior_state,
    };

    debug!(
        "Selecting {} storage for cluster '{}' (expect prior state: {})",
        policy.storage_type, cluster.name, expect_prior_state
    );

    let handle = match policy.storage_type {
        StorageType::PersistentVolume => {
            let provisioner = cluster
                .pv_provisioner
                .as_deref()
                .context("persistent volume storage requires a volume provisioner")?;
            backends
                .persistent_volume(&target, provisioner)
                .context(format!(
                    "Failed to set up persistent volume storage for cluster '{}'",
                    cluster.name
                ))?
        }
        StorageType::ObjectStore => {
            let store = cluster
                .object_store
                .as_ref()
                .context("object store storage requires an object store context")?;
            backends
                .object_store(&target, store)
                .context(format!(
                    "Failed to set up object store storage for cluster '{}'",
                    cluster.name
                ))?
        }
        StorageType::None => {
            info!("No backup storage configured for cluster '{}'", cluster.name);
            return Ok(None);
        }
    };

    info!(
        "Using {} storage for cluster '{}'",
        handle.storage_type(),
        cluster.name
    );
    Ok(Some(handle))
}
