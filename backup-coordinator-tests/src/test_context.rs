//! Test context and harness for lifecycle testing
//!
//! Wires recording mocks into coordinators and exposes a shared event log so
//! tests can assert ordering across storage and orchestration calls.

use crate::config_builder::ClusterSetup;
use backup_coordinator::storage::mock::{EventLog, MockStorageBackends};
use backup_coordinator::workload::client::mock::MockWorkloadClient;
use backup_coordinator::workload::{ClientError, DefaultSpecFactory, WorkloadClient, WorkloadSpec};
use backup_coordinator::{BackupCoordinator, Collaborators, CoordinatorError};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Test context that owns the mocks behind a coordinator
pub struct TestContext {
    temp_dir: TempDir,
    events: EventLog,
    pub backends: MockStorageBackends,
    pub client: MockWorkloadClient,
}

impl TestContext {
    /// Context with well-behaved mocks
    pub fn new() -> Self {
        Self::with_mocks(MockStorageBackends::new(), MockWorkloadClient::new())
    }

    /// Context with pre-configured mocks; both get the shared event log
    pub fn with_mocks(backends: MockStorageBackends, client: MockWorkloadClient) -> Self {
        let events = EventLog::default();
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
            backends: backends.with_event_log(Arc::clone(&events)),
            client: client.with_event_log(Arc::clone(&events)),
            events,
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators::new(
            Arc::new(self.backends.clone()),
            Arc::new(self.client.clone()),
            Arc::new(DefaultSpecFactory::new()),
        )
    }

    /// Construct a coordinator over this context's mocks
    pub fn coordinator(&self, setup: &ClusterSetup) -> Result<BackupCoordinator, CoordinatorError> {
        BackupCoordinator::new(
            Arc::clone(&setup.cluster),
            setup.backup.clone(),
            setup.restore.clone(),
            &self.collaborators(),
            setup.is_new_cluster,
        )
    }

    /// Events recorded by all mocks, in call order
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// Position of the first event starting with `prefix`
    pub fn event_index(&self, prefix: &str) -> Option<usize> {
        self.events().iter().position(|e| e.starts_with(prefix))
    }

    /// Get the temporary directory path
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a file in the temp dir
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Client whose create calls fail a set number of times before succeeding
pub struct FlakyClient {
    inner: MockWorkloadClient,
    remaining_failures: Mutex<usize>,
}

impl FlakyClient {
    pub fn new(inner: MockWorkloadClient, failures: usize) -> Self {
        Self {
            inner,
            remaining_failures: Mutex::new(failures),
        }
    }
}

impl WorkloadClient for FlakyClient {
    fn create_workload(
        &self,
        cluster_name: &str,
        namespace: &str,
        spec: &WorkloadSpec,
    ) -> Result<(), ClientError> {
        let mut remaining = self.remaining_failures.lock();
        if *remaining > 0 {
            *remaining -= 1;
            return Err(anyhow::anyhow!("control plane unavailable").into());
        }
        drop(remaining);
        self.inner.create_workload(cluster_name, namespace, spec)
    }

    fn delete_workload(&self, cluster_name: &str, namespace: &str) -> Result<(), ClientError> {
        self.inner.delete_workload(cluster_name, namespace)
    }
}

/// Extension trait for assertion helpers
pub trait ResultAssertions<T> {
    /// Assert that the result is Ok and return the value
    fn assert_ok(self) -> T;

    /// Assert that the result is Err and its message contains the given string
    fn assert_err_contains(self, needle: &str);
}

impl<T, E: std::fmt::Display> ResultAssertions<T> for Result<T, E> {
    fn assert_ok(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {}", e),
        }
    }

    fn assert_err_contains(self, needle: &str) {
        match self {
            Ok(_) => panic!("Expected Err containing '{}', got Ok", needle),
            Err(e) => {
                let err_msg = e.to_string();
                assert!(
                    err_msg.contains(needle),
                    "Error '{}' does not contain '{}'",
                    err_msg,
                    needle
                );
            }
        }
    }
}
