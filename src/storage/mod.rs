//! Backup storage abstraction
//!
//! A storage handle is "where backup data lives". Concrete backends are
//! supplied by the caller through [`StorageBackends`]; this module only picks
//! which one to construct.

pub mod dry_run;
pub mod selector;

use crate::config::{BackupPolicy, ObjectStoreContext};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use dry_run::DryRunBackends;
pub use selector::{expect_prior_state, select_storage};

/// Declared storage type of a backup policy
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    /// Ephemeral scratch space, no storage handle
    #[default]
    None,
    PersistentVolume,
    ObjectStore,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::None => "none",
            StorageType::PersistentVolume => "persistent_volume",
            StorageType::ObjectStore => "object_store",
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle over one backend's stored backup data
///
/// `clone_backup` must be safe to call again for the same source after a
/// partial failure; the coordinator never rolls a clone back.
pub trait StorageHandle: Send + Sync {
    /// Seed this cluster's storage with another cluster's backups
    fn clone_backup(&self, source_cluster_name: &str) -> Result<()>;

    /// Delete this cluster's backup storage
    fn delete(&self) -> Result<()>;

    /// Storage type backing this handle (for logging)
    fn storage_type(&self) -> StorageType;
}

/// Parameters shared by every backend constructor
#[derive(Debug, Clone, Copy)]
pub struct StorageTarget<'a> {
    pub cluster_name: &'a str,
    pub namespace: &'a str,
    pub policy: &'a BackupPolicy,
    /// Attach to existing remote state instead of provisioning fresh state
    pub expect_prior_state: bool,
}

/// Constructors for the concrete storage backends
///
/// Construction may perform I/O (checking that a bucket or volume exists).
pub trait StorageBackends: Send + Sync {
    fn persistent_volume(
        &self,
        target: &StorageTarget<'_>,
        provisioner: &str,
    ) -> Result<Box<dyn StorageHandle>>;

    fn object_store(
        &self,
        target: &StorageTarget<'_>,
        store: &ObjectStoreContext,
    ) -> Result<Box<dyn StorageHandle>>;
}

/// Mock implementation for testing
/// Available for use in external test crates
#[allow(dead_code)]
pub mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Shared, ordered record of calls across several mocks
    pub type EventLog = Arc<Mutex<Vec<String>>>;

    /// Recorded storage call
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum StorageCall {
        Construct {
            storage_type: StorageType,
            cluster: String,
            expect_prior_state: bool,
        },
        Clone { source: String },
        Delete,
    }

    /// Mock storage handle
    #[derive(Clone)]
    pub struct MockStorage {
        storage_type: StorageType,
        calls: Arc<Mutex<Vec<StorageCall>>>,
        events: Option<EventLog>,
        fail_clone: bool,
        fail_delete: bool,
    }

    impl MockStorage {
        fn record(&self, call: StorageCall) {
            if let Some(ref events) = self.events {
                let event = match &call {
                    StorageCall::Construct { storage_type, .. } => {
                        format!("construct:{}", storage_type)
                    }
                    StorageCall::Clone { source } => format!("clone:{}", source),
                    StorageCall::Delete => "delete-storage".to_string(),
                };
                events.lock().unwrap().push(event);
            }
            self.calls.lock().unwrap().push(call);
        }
    }

    impl StorageHandle for MockStorage {
        fn clone_backup(&self, source_cluster_name: &str) -> Result<()> {
            self.record(StorageCall::Clone {
                source: source_cluster_name.to_string(),
            });
            if self.fail_clone {
                anyhow::bail!("Mock clone failure from {}", source_cluster_name);
            }
            Ok(())
        }

        fn delete(&self) -> Result<()> {
            self.record(StorageCall::Delete);
            if self.fail_delete {
                anyhow::bail!("Mock storage delete failure");
            }
            Ok(())
        }

        fn storage_type(&self) -> StorageType {
            self.storage_type
        }
    }

    /// Mock backend constructors; every handle shares this mock's call log
    #[derive(Clone, Default)]
    pub struct MockStorageBackends {
        /// Recorded calls from construction and all constructed handles
        pub calls: Arc<Mutex<Vec<StorageCall>>>,
        events: Option<EventLog>,
        fail_construct: bool,
        fail_clone: bool,
        fail_delete: bool,
    }

    impl MockStorageBackends {
        pub fn new() -> Self {
            Self::default()
        }

        /// Append events to a log shared with other mocks
        pub fn with_event_log(mut self, events: EventLog) -> Self {
            self.events = Some(events);
            self
        }

        /// Configure construction to fail
        pub fn with_failing_construct(mut self) -> Self {
            self.fail_construct = true;
            self
        }

        /// Configure clone to fail
        pub fn with_failing_clone(mut self) -> Self {
            self.fail_clone = true;
            self
        }

        /// Configure delete to fail
        pub fn with_failing_delete(mut self) -> Self {
            self.fail_delete = true;
            self
        }

        /// Get all recorded calls
        pub fn get_calls(&self) -> Vec<StorageCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn constructed(&self) -> bool {
            self.get_calls()
                .iter()
                .any(|c| matches!(c, StorageCall::Construct { .. }))
        }

        pub fn clone_calls(&self) -> Vec<String> {
            self.get_calls()
                .into_iter()
                .filter_map(|c| match c {
                    StorageCall::Clone { source } => Some(source),
                    _ => None,
                })
                .collect()
        }

        pub fn delete_count(&self) -> usize {
            self.get_calls()
                .iter()
                .filter(|c| matches!(c, StorageCall::Delete))
                .count()
        }

        fn build(
            &self,
            storage_type: StorageType,
            target: &StorageTarget<'_>,
        ) -> Result<Box<dyn StorageHandle>> {
            let handle = MockStorage {
                storage_type,
                calls: Arc::clone(&self.calls),
                events: self.events.clone(),
                fail_clone: self.fail_clone,
                fail_delete: self.fail_delete,
            };
            handle.record(StorageCall::Construct {
                storage_type,
                cluster: target.cluster_name.to_string(),
                expect_prior_state: target.expect_prior_state,
            });
            if self.fail_construct {
                anyhow::bail!("Mock {} construction failure", storage_type);
            }
            Ok(Box::new(handle))
        }
    }

    impl StorageBackends for MockStorageBackends {
        fn persistent_volume(
            &self,
            target: &StorageTarget<'_>,
            _provisioner: &str,
        ) -> Result<Box<dyn StorageHandle>> {
            self.build(StorageType::PersistentVolume, target)
        }

        fn object_store(
            &self,
            target: &StorageTarget<'_>,
            _store: &ObjectStoreContext,
        ) -> Result<Box<dyn StorageHandle>> {
            self.build(StorageType::ObjectStore, target)
        }
    }
}
