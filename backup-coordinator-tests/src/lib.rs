//! Test utilities for backup-coordinator
//!
//! This crate provides shared test utilities, mock wiring, and helper
//! functions for testing the backup coordinator.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_utils::{ClusterConfigBuilder, TestContext};
//!
//! #[test]
//! fn my_test() {
//!     let ctx = TestContext::new();
//!     let setup = ClusterConfigBuilder::new("target").persistent_volume().build();
//!     let mut coordinator = ctx.coordinator(&setup).unwrap();
//!     coordinator.setup().unwrap();
//! }
//! ```

pub mod config_builder;
pub mod fixtures;
pub mod test_context;

// Re-export commonly used items
pub use config_builder::{ClusterConfigBuilder, ClusterSetup};
pub use fixtures::*;
pub use test_context::{FlakyClient, ResultAssertions, TestContext};

// Re-export types from the main crate for convenience
pub use backup_coordinator::config::{BackupPolicy, ClusterConfig, RestorePolicy};
pub use backup_coordinator::{
    BackupCoordinator, Collaborators, CoordinatorError, Phase, RestoreAction, StorageType,
};

// Re-export mock implementations from the main crate
pub use backup_coordinator::storage::mock::{MockStorageBackends, StorageCall};
pub use backup_coordinator::workload::client::mock::{ClientCall, MockWorkloadClient};
pub use backup_coordinator::workload::composer::mock::MockSpecFactory;
