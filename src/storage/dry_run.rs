//! Storage backends that only log what they would do

use super::{StorageBackends, StorageHandle, StorageTarget, StorageType};
use crate::config::ObjectStoreContext;
use anyhow::Result;
use tracing::info;

/// Backends producing handles that never touch a platform
#[derive(Debug, Clone, Default)]
pub struct DryRunBackends;

impl DryRunBackends {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug)]
struct DryRunStorage {
    storage_type: StorageType,
    location: String,
    remove_backups: bool,
}

impl StorageHandle for DryRunStorage {
    fn clone_backup(&self, source_cluster_name: &str) -> Result<()> {
        info!(
            "[dry-run] would clone backups of '{}' into {}",
            source_cluster_name, self.location
        );
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        if self.remove_backups {
            info!("[dry-run] would delete {}", self.location);
        } else {
            info!("[dry-run] would release {} and keep its backups", self.location);
        }
        Ok(())
    }

    fn storage_type(&self) -> StorageType {
        self.storage_type
    }
}

fn describe_attach(target: &StorageTarget<'_>) -> &'static str {
    if target.expect_prior_state {
        "attach to existing"
    } else {
        "provision"
    }
}

impl StorageBackends for DryRunBackends {
    fn persistent_volume(
        &self,
        target: &StorageTarget<'_>,
        provisioner: &str,
    ) -> Result<Box<dyn StorageHandle>> {
        let location = format!(
            "volume claim {}/{}-backup-pvc",
            target.namespace, target.cluster_name
        );
        info!(
            "[dry-run] would {} {} ({} MB via {})",
            describe_attach(target),
            location,
            target.policy.volume_size_mb,
            provisioner
        );
        Ok(Box::new(DryRunStorage {
            storage_type: StorageType::PersistentVolume,
            location,
            remove_backups: target.policy.cleanup_backups_on_delete,
        }))
    }

    fn object_store(
        &self,
        target: &StorageTarget<'_>,
        store: &ObjectStoreContext,
    ) -> Result<Box<dyn StorageHandle>> {
        let location = format!(
            "s3://{}/{}/{}",
            store.bucket, target.namespace, target.cluster_name
        );
        info!("[dry-run] would {} {}", describe_attach(target), location);
        Ok(Box::new(DryRunStorage {
            storage_type: StorageType::ObjectStore,
            location,
            remove_backups: target.policy.cleanup_backups_on_delete,
        }))
    }
}
