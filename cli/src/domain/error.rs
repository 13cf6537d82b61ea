//! Typed domain error enums.
//!
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator. Callers that need to branch on the failure stage
//! recover them with `anyhow::Error::downcast_ref`.

use thiserror::Error;

// ── Pod lifecycle errors ──────────────────────────────────────────────────────

/// Errors raised while provisioning, preparing, or addressing a pod.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PodError {
    #[error("Provider returned no pod for the requested resources: {0}")]
    Provision(String),

    #[error("Pod {pod_id} did not reach RUNNING in time.")]
    NotReady { pod_id: String },

    #[error("Pod {pod_id} never accepted SSH connections.")]
    SshUnavailable { pod_id: String },

    #[error("Transfer {from} -> {to} failed on pod {pod_id} (exit {code}): {stderr}")]
    Transfer {
        pod_id: String,
        from: String,
        to: String,
        code: i32,
        stderr: String,
    },

    #[error("Pod '{0}' not found.")]
    NotFound(String),

    #[error("Pod {0} exposes no SSH port (private port 22). Is it running?")]
    NoSshEndpoint(String),
}

impl PodError {
    /// Pod identifier carried by the error, if any.
    #[must_use]
    pub fn pod_id(&self) -> Option<&str> {
        match self {
            Self::Provision(_) => None,
            Self::NotReady { pod_id }
            | Self::SshUnavailable { pod_id }
            | Self::Transfer { pod_id, .. } => Some(pod_id),
            Self::NotFound(id) | Self::NoSshEndpoint(id) => Some(id),
        }
    }

    /// Stable machine-readable code used by `--json` error output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Provision(_) => "provision_failed",
            Self::NotReady { .. } => "pod_not_ready",
            Self::SshUnavailable { .. } => "ssh_unavailable",
            Self::Transfer { .. } => "transfer_failed",
            Self::NotFound(_) => "pod_not_found",
            Self::NoSshEndpoint(_) => "no_ssh_endpoint",
        }
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration and presets.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\nExpected: {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: String,
    },

    #[error("No API key configured. Run: podctl config set api_key <key>")]
    MissingApiKey,

    #[error("Preset '{0}' not found. List presets with: podctl preset list")]
    UnknownPreset(String),

    #[error("Invalid preset name '{0}': must match ^[a-z0-9][a-z0-9_-]{{0,31}}$")]
    InvalidPresetName(String),
}
