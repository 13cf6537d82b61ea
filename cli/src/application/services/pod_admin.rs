//! Application service: manual pod administration.
//!
//! Listing, start/stop, single-pod kill, and file transfer. None of these
//! create pods, so none of them touch the auto-termination timer.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::{ManagedPodStore, PodApi, RemoteExecutor};
use crate::application::services::registry::terminate_and_forget;
use crate::domain::{Pod, PodError};

/// Which way a transfer copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferDirection {
    /// Local path to remote path.
    Upload { local: PathBuf, remote: String },
    /// Remote path to local path.
    Download {
        remote: String,
        local: PathBuf,
        recursive: bool,
    },
}

/// Every pod on the account.
///
/// # Errors
///
/// Returns an error if the provider call fails.
pub async fn list_pods(api: &impl PodApi) -> Result<Vec<Pod>> {
    let mut pods = api.list_pods().await?;
    pods.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(pods)
}

/// Look a pod up, turning "unknown id" into `PodError::NotFound`.
///
/// # Errors
///
/// Returns `PodError::NotFound` or the provider error.
pub async fn require_pod(api: &impl PodApi, pod_id: &str) -> Result<Pod> {
    api.get_pod(pod_id)
        .await
        .with_context(|| format!("looking up pod {pod_id}"))?
        .ok_or_else(|| PodError::NotFound(pod_id.to_string()).into())
}

/// Resume a stopped pod with the GPU count it was created with.
///
/// # Errors
///
/// Returns `PodError::NotFound` for an unknown id or the provider error.
pub async fn start_pod(api: &impl PodApi, pod_id: &str) -> Result<Pod> {
    let pod = require_pod(api, pod_id).await?;
    api.resume_pod(pod_id, pod.gpu_count.max(1))
        .await
        .with_context(|| format!("resuming pod {pod_id}"))
}

/// Stop a running pod.
///
/// # Errors
///
/// Returns `PodError::NotFound` for an unknown id or the provider error.
pub async fn stop_pod(api: &impl PodApi, pod_id: &str) -> Result<Pod> {
    require_pod(api, pod_id).await?;
    api.stop_pod(pod_id)
        .await
        .with_context(|| format!("stopping pod {pod_id}"))
}

/// Terminate one pod and drop it from the registry.
///
/// An id the provider does not know is still removed from the registry before
/// `PodError::NotFound` is returned, so stale entries can be cleared by hand.
///
/// # Errors
///
/// Returns `PodError::NotFound` or the terminate error.
pub async fn kill_pod(
    api: &impl PodApi,
    registry: &impl ManagedPodStore,
    pod_id: &str,
) -> Result<()> {
    if api
        .get_pod(pod_id)
        .await
        .with_context(|| format!("looking up pod {pod_id}"))?
        .is_none()
    {
        registry.unregister(pod_id)?;
        return Err(PodError::NotFound(pod_id.to_string()).into());
    }
    terminate_and_forget(api, registry, pod_id).await
}

/// Copy files to or from a pod.
///
/// # Errors
///
/// Returns `PodError::NoSshEndpoint`, `PodError::Transfer`, or an I/O error.
pub async fn transfer(
    executor: &impl RemoteExecutor,
    pod_id: &str,
    direction: &TransferDirection,
) -> Result<()> {
    match direction {
        TransferDirection::Upload { local, remote } => {
            anyhow::ensure!(local.exists(), "local path {} does not exist", local.display());
            executor.transfer_to(pod_id, local, remote).await
        }
        TransferDirection::Download {
            remote,
            local,
            recursive,
        } => executor.transfer_from(pod_id, remote, local, *recursive).await,
    }
}
