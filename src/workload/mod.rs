//! Backup sidecar workload: spec model, composition, and submission

pub mod client;
pub mod composer;
pub mod spec;

pub use client::{ClientError, DryRunClient, WorkloadClient};
pub use composer::{compose_sidecar_spec, BaseSpecFactory, DefaultSpecFactory};
pub use spec::{
    EnvVar, ResourceLimits, RestartPolicy, Volume, VolumeMount, VolumeSource, WorkloadSpec,
};
