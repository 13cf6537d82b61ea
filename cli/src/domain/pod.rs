//! Pod domain types: the locally cached view of a provider-owned pod.
//!
//! Pure data only. Status transitions belong to the provider and are only
//! ever observed through polling.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::ssh::SshEndpoint;

/// Desired status reported by the provider.
///
/// Only `RUNNING` and `EXITED` carry meaning for the lifecycle core; every
/// other provider state is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PodStatus {
    Running,
    Exited,
    Other(String),
}

impl From<String> for PodStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "RUNNING" => Self::Running,
            "EXITED" => Self::Exited,
            _ => Self::Other(s),
        }
    }
}

impl From<PodStatus> for String {
    fn from(status: PodStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for PodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => f.write_str("RUNNING"),
            Self::Exited => f.write_str("EXITED"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

/// One exposed port of a pod's runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    pub private_port: u16,
    pub public_port: u16,
    /// Host address reachable from outside.
    pub ip: String,
    pub is_ip_public: bool,
    /// `tcp` or `http`.
    #[serde(rename = "type")]
    pub protocol: String,
}

/// Runtime descriptor: present only once the container is up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodRuntime {
    #[serde(default)]
    pub uptime_in_seconds: u64,
    #[serde(default)]
    pub ports: Vec<PortMapping>,
}

/// A remote GPU pod.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pod {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub desired_status: PodStatus,
    #[serde(default)]
    pub image_name: Option<String>,
    #[serde(default)]
    pub gpu_count: u32,
    /// Hourly cost in USD.
    #[serde(default)]
    pub cost_per_hr: f64,
    #[serde(default)]
    pub runtime: Option<PodRuntime>,
}

impl Pod {
    /// Whether the provider reports this pod as running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.desired_status == PodStatus::Running
    }

    /// Seconds since the container started, zero when it has no runtime.
    #[must_use]
    pub fn uptime_secs(&self) -> u64 {
        self.runtime.as_ref().map_or(0, |r| r.uptime_in_seconds)
    }

    /// Derive the SSH endpoint from the runtime port list.
    ///
    /// A pod without a runtime descriptor has no reachable endpoint.
    #[must_use]
    pub fn ssh_endpoint(&self) -> Option<SshEndpoint> {
        self.runtime
            .as_ref()
            .and_then(|r| SshEndpoint::from_ports(&r.ports))
    }
}

/// Account information for the API key in use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub client_balance: f64,
    #[serde(default)]
    pub current_spend_per_hr: f64,
}

/// A GPU type offered by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpuType {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub memory_in_gb: u32,
}

/// Format an uptime in seconds as `1h 2m` / `3m 4s`.
#[must_use]
pub fn format_uptime(secs: u64) -> String {
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    if h > 0 {
        format!("{h}h {m}m")
    } else if m > 0 {
        format!("{m}m {s}s")
    } else {
        format!("{s}s")
    }
}
