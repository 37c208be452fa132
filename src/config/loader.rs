use super::types::*;
use crate::storage::StorageType;
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Load and validate configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(contents: &str) -> Result<Config> {
    let config: Config = toml::from_str(contents)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate the configuration
fn validate_config(config: &Config) -> Result<()> {
    validate_label("cluster name", &config.cluster.name)?;
    validate_label("namespace", &config.cluster.namespace)?;

    validate_backup(config)?;

    if let Some(ref restore) = config.restore {
        if restore.backup_cluster_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "restore.backup_cluster_name must not be empty".to_string(),
            ));
        }
    }

    if config.sidecar.image.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "sidecar.image must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_backup(config: &Config) -> Result<()> {
    let backup = &config.backup;

    if backup.backup_interval_seconds == 0 {
        return Err(ConfigError::ValidationError(
            "backup.backup_interval_seconds must be greater than zero".to_string(),
        ));
    }

    match backup.storage_type {
        StorageType::PersistentVolume => {
            let provisioner = config.cluster.pv_provisioner.as_deref().unwrap_or("");
            if provisioner.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "storage_type 'persistent_volume' requires cluster.pv_provisioner".to_string(),
                ));
            }
            if backup.volume_size_mb == 0 {
                return Err(ConfigError::ValidationError(
                    "backup.volume_size_mb must be greater than zero".to_string(),
                ));
            }
        }
        StorageType::ObjectStore => match config.cluster.object_store {
            Some(ref store) if !store.bucket.trim().is_empty() => {}
            Some(_) => {
                return Err(ConfigError::ValidationError(
                    "cluster.object_store.bucket must not be empty".to_string(),
                ));
            }
            None => {
                return Err(ConfigError::ValidationError(
                    "storage_type 'object_store' requires a [cluster.object_store] table"
                        .to_string(),
                ));
            }
        },
        StorageType::None => {}
    }

    Ok(())
}

/// Names end up in workload and volume names, so they must be DNS labels
fn validate_label(what: &str, value: &str) -> Result<()> {
    if !is_dns_label(value) {
        return Err(ConfigError::ValidationError(format!(
            "invalid {} '{}': expected lowercase alphanumerics and '-', at most 63 characters",
            what, value
        )));
    }
    Ok(())
}

pub(crate) fn is_dns_label(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= 63
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !value.starts_with('-')
        && !value.ends_with('-')
}
