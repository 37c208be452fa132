//! Sidecar workload specification

use serde::Serialize;
use std::collections::BTreeMap;

/// Everything the orchestration client needs to run the sidecar
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WorkloadSpec {
    pub name: String,
    pub restart_policy: RestartPolicy,
    pub image: String,
    pub args: Vec<String>,
    pub resources: ResourceLimits,
    pub labels: BTreeMap<String, String>,
    pub env: Vec<EnvVar>,
    pub volumes: Vec<Volume>,
    pub mounts: Vec<VolumeMount>,
}

/// Restart behaviour of the sidecar workload
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum RestartPolicy {
    Always,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ResourceLimits {
    pub cpu_millis: u32,
    pub memory_mb: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Volume {
    pub name: String,
    pub source: VolumeSource,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VolumeSource {
    PersistentClaim { claim_name: String },
    Secret { secret_name: String },
    ConfigMap { name: String },
    /// Node-local scratch space, gone with the workload
    EmptyDir,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VolumeMount {
    pub volume: String,
    pub mount_path: String,
}

impl WorkloadSpec {
    /// Add a volume and mount it at `mount_path`
    pub fn with_volume(mut self, name: &str, source: VolumeSource, mount_path: &str) -> Self {
        self.volumes.push(Volume {
            name: name.to_string(),
            source,
        });
        self.mounts.push(VolumeMount {
            volume: name.to_string(),
            mount_path: mount_path.to_string(),
        });
        self
    }

    pub fn with_env(mut self, name: &str, value: impl Into<String>) -> Self {
        self.env.push(EnvVar {
            name: name.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn env_value(&self, name: &str) -> Option<&str> {
        self.env
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.value.as_str())
    }

    pub fn volume(&self, name: &str) -> Option<&Volume> {
        self.volumes.iter().find(|v| v.name == name)
    }
}
