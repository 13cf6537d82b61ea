//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::{GpuType, Pod, PodctlConfig, Presets, ResourceSpec, UserInfo};

// ── Value Types ───────────────────────────────────────────────────────────────

/// How a remote command's output streams are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    /// Capture stdout/stderr into the returned `ExecOutcome`.
    Captured,
    /// Attach stdout/stderr to the controlling terminal.
    Inherited,
}

/// Result of one remote command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutcome {
    pub exit_code: i32,
    /// Empty in `StreamMode::Inherited`.
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutcome {
    /// An outcome with nothing captured.
    #[must_use]
    pub fn exited(exit_code: i32) -> Self {
        Self {
            exit_code,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

// ── Remote Compute Port ───────────────────────────────────────────────────────

/// The provider's pod API.
///
/// `Send + Sync` with boxed futures so the auto-termination timer can drive it
/// from a spawned task.
#[async_trait]
pub trait PodApi: Send + Sync {
    /// Create a pod. `Ok(None)` means the provider accepted the request but
    /// returned no pod (typically: no capacity for the requested GPU).
    async fn create_pod(&self, spec: &ResourceSpec) -> Result<Option<Pod>>;
    /// Fetch one pod. `Ok(None)` when the provider does not know the id.
    async fn get_pod(&self, pod_id: &str) -> Result<Option<Pod>>;
    /// List every pod owned by the account.
    async fn list_pods(&self) -> Result<Vec<Pod>>;
    /// Terminate a pod. Terminating a pod that no longer exists is `Ok`.
    async fn terminate_pod(&self, pod_id: &str) -> Result<()>;
    /// Stop a running pod, keeping its volume.
    async fn stop_pod(&self, pod_id: &str) -> Result<Pod>;
    /// Resume a stopped pod with `gpu_count` GPUs.
    async fn resume_pod(&self, pod_id: &str, gpu_count: u32) -> Result<Pod>;
    /// Account information for the current API key.
    async fn user_info(&self) -> Result<UserInfo>;
    /// GPU types the provider offers.
    async fn gpu_types(&self) -> Result<Vec<GpuType>>;
}

// ── Managed-Pod Registry Port ─────────────────────────────────────────────────

/// Durable set of pod ids this tool is responsible for.
///
/// Each mutation is a whole-set read-modify-write. Synchronous so the
/// auto-termination task can call it from any thread.
pub trait ManagedPodStore: Send + Sync {
    /// Add `pod_id` to the set. Adding an existing id is a no-op.
    fn register(&self, pod_id: &str) -> Result<()>;
    /// Remove `pod_id` from the set. Removing an unknown id is a no-op.
    fn unregister(&self, pod_id: &str) -> Result<()>;
    /// Current set of managed ids.
    fn list(&self) -> Result<BTreeSet<String>>;
}

// ── Remote Execution Ports ────────────────────────────────────────────────────

/// Commands, transfers, and interactive sessions against a pod's SSH endpoint.
///
/// Every call resolves the pod's endpoint first and opens a fresh connection.
#[allow(async_fn_in_trait)]
pub trait RemoteExecutor {
    /// Run `command` on the pod.
    async fn execute(&self, pod_id: &str, command: &str, mode: StreamMode)
    -> Result<ExecOutcome>;
    /// Copy a local file or directory (recursively) to the pod.
    async fn transfer_to(&self, pod_id: &str, local: &Path, remote: &str) -> Result<()>;
    /// Copy a remote path to the local machine.
    async fn transfer_from(
        &self,
        pod_id: &str,
        remote: &str,
        local: &Path,
        recursive: bool,
    ) -> Result<()>;
    /// Open an interactive login shell. Returns the session's exit code.
    async fn interactive_session(&self, pod_id: &str) -> Result<i32>;
}

/// SSH reachability check used by the readiness poller.
#[allow(async_fn_in_trait)]
pub trait ReachabilityCheck {
    /// `true` once a trivial remote command succeeds. Never errors.
    async fn is_reachable(&self, pod_id: &str) -> bool;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: std::time::Duration,
    ) -> Result<Output>;
    /// Run a program with inherited stdio and return only its exit status.
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<std::process::ExitStatus>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Config and Preset Ports ───────────────────────────────────────────────────

/// Abstracts configuration persistence.
pub trait ConfigStore {
    /// Load the configuration, returning defaults when no file exists.
    fn load(&self) -> Result<PodctlConfig>;
    /// Persist the configuration.
    fn save(&self, config: &PodctlConfig) -> Result<()>;
    /// Location of the config file.
    fn path(&self) -> Result<PathBuf>;
}

/// Abstracts preset persistence.
pub trait PresetStore {
    /// Load every preset, empty when no file exists.
    fn load(&self) -> Result<Presets>;
    /// Replace the stored presets.
    fn save(&self, presets: &Presets) -> Result<()>;
}
