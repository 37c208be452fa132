//! Orchestration client abstraction for testability
//!
//! The sidecar is represented on the platform as a replica-managed workload
//! plus a service. Implementations create and delete both together.

#![allow(dead_code)]

use super::spec::WorkloadSpec;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{kind} '{name}' not found")]
    NotFound { kind: String, name: String },

    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: String, name: String },

    #[error(transparent)]
    Api(#[from] anyhow::Error),
}

/// Creates and deletes the backup sidecar on the cluster control plane
pub trait WorkloadClient: Send + Sync {
    /// Create the sidecar replica set and service
    fn create_workload(
        &self,
        cluster_name: &str,
        namespace: &str,
        spec: &WorkloadSpec,
    ) -> Result<(), ClientError>;

    /// Delete the sidecar replica set and service
    fn delete_workload(&self, cluster_name: &str, namespace: &str) -> Result<(), ClientError>;
}

/// Client that logs requests and never contacts a control plane
#[derive(Debug, Clone, Default)]
pub struct DryRunClient;

impl DryRunClient {
    pub fn new() -> Self {
        Self
    }
}

impl WorkloadClient for DryRunClient {
    fn create_workload(
        &self,
        cluster_name: &str,
        namespace: &str,
        spec: &WorkloadSpec,
    ) -> Result<(), ClientError> {
        info!(
            "[dry-run] would create replica set and service '{}' in {} for cluster '{}'",
            spec.name, namespace, cluster_name
        );
        Ok(())
    }

    fn delete_workload(&self, cluster_name: &str, namespace: &str) -> Result<(), ClientError> {
        info!(
            "[dry-run] would delete backup replica set and service of cluster '{}' in {}",
            cluster_name, namespace
        );
        Ok(())
    }
}

/// Mock implementation for testing
/// Available for use in external test crates
#[allow(dead_code)]
pub mod mock {
    use super::*;
    use crate::storage::mock::EventLog;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Recorded client call
    #[derive(Clone, Debug)]
    pub enum ClientCall {
        Create {
            cluster: String,
            namespace: String,
            spec: WorkloadSpec,
        },
        Delete {
            cluster: String,
            namespace: String,
        },
    }

    /// Mock orchestration client backed by an in-memory workload table
    #[derive(Clone, Default)]
    pub struct MockWorkloadClient {
        /// Recorded operation calls
        pub calls: Arc<Mutex<Vec<ClientCall>>>,
        /// Workloads currently "running", keyed by namespace/cluster
        pub running: Arc<Mutex<HashMap<String, WorkloadSpec>>>,
        events: Option<EventLog>,
        fail_create: bool,
        fail_delete: bool,
    }

    fn key(cluster: &str, namespace: &str) -> String {
        format!("{}/{}", namespace, cluster)
    }

    impl MockWorkloadClient {
        pub fn new() -> Self {
            Self::default()
        }

        /// Append events to a log shared with other mocks
        pub fn with_event_log(mut self, events: EventLog) -> Self {
            self.events = Some(events);
            self
        }

        /// Configure create to fail with an API error
        pub fn with_failing_create(mut self) -> Self {
            self.fail_create = true;
            self
        }

        /// Configure delete to fail with an API error
        pub fn with_failing_delete(mut self) -> Self {
            self.fail_delete = true;
            self
        }

        /// Pretend a sidecar already runs for a cluster
        pub fn with_running(self, cluster: &str, namespace: &str, spec: WorkloadSpec) -> Self {
            self.running
                .lock()
                .unwrap()
                .insert(key(cluster, namespace), spec);
            self
        }

        /// Get all recorded calls
        pub fn get_calls(&self) -> Vec<ClientCall> {
            self.calls.lock().unwrap().clone()
        }

        /// Specs passed to create, in call order
        pub fn created_specs(&self) -> Vec<WorkloadSpec> {
            self.get_calls()
                .into_iter()
                .filter_map(|c| match c {
                    ClientCall::Create { spec, .. } => Some(spec),
                    _ => None,
                })
                .collect()
        }

        pub fn delete_count(&self) -> usize {
            self.get_calls()
                .iter()
                .filter(|c| matches!(c, ClientCall::Delete { .. }))
                .count()
        }

        pub fn running_count(&self) -> usize {
            self.running.lock().unwrap().len()
        }

        fn record(&self, call: ClientCall, event: String) {
            if let Some(ref events) = self.events {
                events.lock().unwrap().push(event);
            }
            self.calls.lock().unwrap().push(call);
        }
    }

    impl WorkloadClient for MockWorkloadClient {
        fn create_workload(
            &self,
            cluster_name: &str,
            namespace: &str,
            spec: &WorkloadSpec,
        ) -> Result<(), ClientError> {
            self.record(
                ClientCall::Create {
                    cluster: cluster_name.to_string(),
                    namespace: namespace.to_string(),
                    spec: spec.clone(),
                },
                format!("create:{}", spec.name),
            );
            if self.fail_create {
                return Err(anyhow::anyhow!("Mock create failure for {}", spec.name).into());
            }

            let mut running = self.running.lock().unwrap();
            let key = key(cluster_name, namespace);
            if running.contains_key(&key) {
                return Err(ClientError::AlreadyExists {
                    kind: "replica set".to_string(),
                    name: spec.name.clone(),
                });
            }
            running.insert(key, spec.clone());
            Ok(())
        }

        fn delete_workload(&self, cluster_name: &str, namespace: &str) -> Result<(), ClientError> {
            self.record(
                ClientCall::Delete {
                    cluster: cluster_name.to_string(),
                    namespace: namespace.to_string(),
                },
                "delete-workload".to_string(),
            );
            if self.fail_delete {
                return Err(anyhow::anyhow!("Mock delete failure for {}", cluster_name).into());
            }

            match self.running.lock().unwrap().remove(&key(cluster_name, namespace)) {
                Some(_) => Ok(()),
                None => Err(ClientError::NotFound {
                    kind: "replica set".to_string(),
                    name: format!("{}-backup-sidecar", cluster_name),
                }),
            }
        }
    }
}
