//! Managed-pod registry operations that involve the provider.
//!
//! The registry itself is a `ManagedPodStore`; this module pairs it with
//! `PodApi` so that every successful terminate also clears the id.

use anyhow::{Context, Result};

use crate::application::ports::{ManagedPodStore, PodApi, ProgressReporter};

/// Terminate `pod_id` and, once the provider accepts, drop it from the registry.
///
/// # Errors
///
/// Returns an error if the terminate call fails (the id stays registered) or
/// the registry cannot be rewritten.
pub async fn terminate_and_forget(
    api: &impl PodApi,
    registry: &impl ManagedPodStore,
    pod_id: &str,
) -> Result<()> {
    api.terminate_pod(pod_id)
        .await
        .with_context(|| format!("terminating pod {pod_id}"))?;
    registry
        .unregister(pod_id)
        .with_context(|| format!("unregistering pod {pod_id}"))?;
    tracing::info!(pod_id, "pod terminated");
    Ok(())
}

/// Terminate every pod in the registry.
///
/// Individual failures are logged and reported, never fatal to the loop.
/// Returns the number of terminate attempts.
///
/// # Errors
///
/// Returns an error only if the registry cannot be read.
pub async fn terminate_all_managed(
    api: &impl PodApi,
    registry: &impl ManagedPodStore,
    reporter: &impl ProgressReporter,
) -> Result<usize> {
    let ids = registry.list().context("reading managed pods")?;
    let mut attempted = 0;
    for pod_id in &ids {
        attempted += 1;
        reporter.step(&format!("terminating managed pod {pod_id}..."));
        match terminate_and_forget(api, registry, pod_id).await {
            Ok(()) => reporter.success(&format!("pod {pod_id} terminated")),
            Err(e) => {
                tracing::warn!(pod_id = %pod_id, error = %format!("{e:#}"), "bulk terminate failed");
                reporter.warn(&format!("could not terminate pod {pod_id}: {e:#}"));
            }
        }
    }
    Ok(attempted)
}
