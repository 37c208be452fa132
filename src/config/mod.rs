//! Configuration module for backup-coordinator
//!
//! Loads one managed cluster's configuration from TOML and resolves it into
//! the runtime values the coordinator works with.
//!
//! ## Example Usage
//!
//! ```no_run
//! use backup_coordinator::config;
//!
//! let config = config::load_config("cluster.toml")?;
//! let cluster = config.cluster_config();
//! let policy = config.backup_policy();
//!
//! println!("Cluster: {}, storage: {}", cluster.name, policy.storage_type);
//! # Ok::<(), config::ConfigError>(())
//! ```

mod loader;
mod types;

pub use loader::{load_config, parse_config, ConfigError, Result};
pub use types::*;

/// Expand tilde (~) in path
pub fn expand_tilde(path: &std::path::Path) -> std::path::PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}
