//! Backup coordinator - sets up and tears down one cluster's backup sidecar

use crate::config::{BackupPolicy, ClusterConfig, RestorePolicy};
use crate::storage::{self, DryRunBackends, StorageBackends, StorageHandle, StorageType};
use crate::workload::{
    compose_sidecar_spec, BaseSpecFactory, ClientError, DefaultSpecFactory, DryRunClient,
    WorkloadClient, WorkloadSpec,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error("Failed to set up backup storage: {0:#}")]
    Backend(anyhow::Error),

    #[error("Failed to compose backup sidecar spec: {0:#}")]
    ComposeSidecar(anyhow::Error),

    #[error("Failed to clone backups from cluster '{source_cluster}': {error:#}")]
    Clone {
        source_cluster: String,
        error: anyhow::Error,
    },

    #[error("Failed to create backup replica set and service: {0}")]
    CreateSidecar(ClientError),

    #[error("Failed to delete backup replica set and service: {0}")]
    DeleteSidecar(ClientError),

    #[error("Failed to delete backup storage: {0:#}")]
    DeleteStorage(anyhow::Error),

    #[error(
        "Failed to delete backup replica set and service: {workload}; \
         failed to delete backup storage: {storage:#}"
    )]
    Cleanup {
        workload: ClientError,
        storage: anyhow::Error,
    },

    #[error("Backup coordinator for cluster '{0}' has already been torn down")]
    TornDown(String),
}

/// Lifecycle phase of a coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Storage selected, no sidecar yet (also after a finished clone)
    Constructed,
    /// A clone is in progress or failed part-way
    Restoring,
    SidecarRunning,
    TornDown,
}

/// What `setup()` will do about the restore policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreAction {
    /// No restore policy declared
    Skip,
    /// Restore declared but there is no storage to restore into
    Demoted { source: String },
    /// Restoring from this cluster's own storage; nothing to copy
    ReuseOwnStorage,
    Clone { source: String },
}

/// External collaborators a coordinator is built from
#[derive(Clone)]
pub struct Collaborators {
    pub backends: Arc<dyn StorageBackends>,
    pub client: Arc<dyn WorkloadClient>,
    pub spec_factory: Arc<dyn BaseSpecFactory>,
}

impl Collaborators {
    pub fn new(
        backends: Arc<dyn StorageBackends>,
        client: Arc<dyn WorkloadClient>,
        spec_factory: Arc<dyn BaseSpecFactory>,
    ) -> Self {
        Self {
            backends,
            client,
            spec_factory,
        }
    }

    /// Collaborators that only log what they would do
    pub fn dry_run() -> Self {
        Self::new(
            Arc::new(DryRunBackends::new()),
            Arc::new(DryRunClient::new()),
            Arc::new(DefaultSpecFactory::new()),
        )
    }
}

/// Owns one cluster's backup storage handle and sidecar lifecycle
///
/// Not safe for concurrent `setup`/`cleanup` calls; the caller serializes them.
pub struct BackupCoordinator {
    cluster: Arc<ClusterConfig>,
    backup_policy: BackupPolicy,
    restore_policy: Option<RestorePolicy>,
    storage: Option<Box<dyn StorageHandle>>,
    client: Arc<dyn WorkloadClient>,
    spec_factory: Arc<dyn BaseSpecFactory>,
    phase: Phase,
    cloned_from: Option<String>,
}

impl BackupCoordinator {
    /// Create a coordinator, constructing the storage handle up front
    ///
    /// Fails if the storage backend cannot be constructed; no coordinator is
    /// returned in that case.
    pub fn new(
        cluster: Arc<ClusterConfig>,
        backup_policy: BackupPolicy,
        restore_policy: Option<RestorePolicy>,
        collaborators: &Collaborators,
        is_new_cluster: bool,
    ) -> Result<Self, CoordinatorError> {
        let expect_prior_state =
            storage::expect_prior_state(is_new_cluster, restore_policy.as_ref(), &cluster.name);

        let storage = storage::select_storage(
            &backup_policy,
            &cluster,
            expect_prior_state,
            collaborators.backends.as_ref(),
        )
        .map_err(CoordinatorError::Backend)?;

        Ok(Self {
            cluster,
            backup_policy,
            restore_policy,
            storage,
            client: Arc::clone(&collaborators.client),
            spec_factory: Arc::clone(&collaborators.spec_factory),
            phase: Phase::Constructed,
            cloned_from: None,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cluster(&self) -> &ClusterConfig {
        &self.cluster
    }

    /// Storage type of the live handle, `None` when there is no storage
    pub fn storage_type(&self) -> Option<StorageType> {
        self.storage.as_ref().map(|s| s.storage_type())
    }

    /// Decide what to do with the restore policy given the selected storage
    pub fn restore_action(&self) -> RestoreAction {
        let Some(ref restore) = self.restore_policy else {
            return RestoreAction::Skip;
        };
        let source = restore.backup_cluster_name.clone();

        if self.storage.is_none() {
            RestoreAction::Demoted { source }
        } else if source == self.cluster.name {
            RestoreAction::ReuseOwnStorage
        } else {
            RestoreAction::Clone { source }
        }
    }

    /// Optionally restore from a prior backup, then launch the sidecar
    pub fn setup(&mut self) -> Result<(), CoordinatorError> {
        match self.phase {
            Phase::TornDown => {
                return Err(CoordinatorError::TornDown(self.cluster.name.clone()));
            }
            Phase::SidecarRunning => {
                info!(
                    "Backup sidecar for cluster '{}' is already running",
                    self.cluster.name
                );
                return Ok(());
            }
            Phase::Constructed | Phase::Restoring => {}
        }

        match self.restore_action() {
            RestoreAction::Skip => {}
            RestoreAction::Demoted { source } => {
                warn!(
                    "Storage is empty, cannot restore cluster '{}' from existing backup ({})",
                    self.cluster.name, source
                );
            }
            RestoreAction::ReuseOwnStorage => {
                info!(
                    "Restoring cluster '{}' from its own existing backup storage",
                    self.cluster.name
                );
            }
            RestoreAction::Clone { source } => self.restore_from(source)?,
        }

        self.run_sidecar()
    }

    fn restore_from(&mut self, source: String) -> Result<(), CoordinatorError> {
        if self.cloned_from.as_deref() == Some(source.as_str()) {
            debug!(
                "Backups of '{}' already cloned into cluster '{}'",
                source, self.cluster.name
            );
            return Ok(());
        }

        let Some(ref storage) = self.storage else {
            return Ok(());
        };

        self.phase = Phase::Restoring;
        info!(
            "Restoring cluster '{}' from existing backup ({})",
            self.cluster.name, source
        );

        storage
            .clone_backup(&source)
            .map_err(|error| CoordinatorError::Clone {
                source_cluster: source.clone(),
                error,
            })?;

        info!("Cloned backups of '{}' into {} storage", source, storage.storage_type());
        self.cloned_from = Some(source);
        self.phase = Phase::Constructed;
        Ok(())
    }

    /// Compose the sidecar spec for the configured storage
    pub fn sidecar_spec(&self) -> Result<WorkloadSpec, CoordinatorError> {
        compose_sidecar_spec(self.spec_factory.as_ref(), &self.backup_policy, &self.cluster)
            .map_err(CoordinatorError::ComposeSidecar)
    }

    fn run_sidecar(&mut self) -> Result<(), CoordinatorError> {
        let spec = self.sidecar_spec()?;
        let c = &self.cluster;

        match self.client.create_workload(&c.name, &c.namespace, &spec) {
            Ok(()) => info!("Backup replica set and service created for cluster '{}'", c.name),
            Err(ClientError::AlreadyExists { kind, name }) => {
                info!(
                    "Backup {} '{}' already exists for cluster '{}', not creating another",
                    kind, name, c.name
                );
            }
            Err(e) => return Err(CoordinatorError::CreateSidecar(e)),
        }

        self.phase = Phase::SidecarRunning;
        Ok(())
    }

    /// Delete the sidecar, then the storage handle
    ///
    /// Both steps are always attempted. A missing sidecar is not an error.
    pub fn cleanup(&mut self) -> Result<(), CoordinatorError> {
        let c = &self.cluster;

        let workload_err = match self.client.delete_workload(&c.name, &c.namespace) {
            Ok(()) => {
                info!("Backup replica set and service deleted for cluster '{}'", c.name);
                None
            }
            Err(ClientError::NotFound { kind, name }) => {
                debug!("Backup {} '{}' not found, nothing to delete", kind, name);
                None
            }
            Err(e) => {
                error!(
                    "Failed to delete backup replica set and service for cluster '{}': {}",
                    c.name, e
                );
                Some(e)
            }
        };

        let storage_err = match self.storage.as_ref().map(|s| s.delete()) {
            None => None,
            Some(Ok(())) => {
                info!("Backup storage deleted for cluster '{}'", c.name);
                self.storage = None;
                None
            }
            Some(Err(e)) => {
                error!("Failed to delete backup storage for cluster '{}': {:#}", c.name, e);
                Some(e)
            }
        };

        self.phase = Phase::TornDown;

        match (workload_err, storage_err) {
            (None, None) => Ok(()),
            (Some(workload), None) => Err(CoordinatorError::DeleteSidecar(workload)),
            (None, Some(storage)) => Err(CoordinatorError::DeleteStorage(storage)),
            (Some(workload), Some(storage)) => Err(CoordinatorError::Cleanup { workload, storage }),
        }
    }
}
