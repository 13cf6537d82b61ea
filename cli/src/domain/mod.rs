//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod pod;
pub mod ssh;
pub mod workload;

#[allow(unused_imports)]
pub use config::{
    PodctlConfig, Presets, ResolvedSpec, ResourceOverrides, ResourceSpec, resolve_spec,
    validate_config_key, validate_config_value,
};
#[allow(unused_imports)]
pub use error::{ConfigError, PodError};
#[allow(unused_imports)]
pub use pod::{GpuType, Pod, PodRuntime, PodStatus, PortMapping, UserInfo};
#[allow(unused_imports)]
pub use ssh::SshEndpoint;
#[allow(unused_imports)]
pub use workload::WorkloadRun;
