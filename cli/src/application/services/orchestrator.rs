//! Application service: ephemeral workload orchestration.
//!
//! create → register → arm auto-termination → wait RUNNING → wait SSH →
//! run the action. Any failure after the pod exists and before the action
//! starts terminates the pod before the error surfaces.
//!
//! Imports only from `crate::domain` and `crate::application`.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;

use crate::application::ports::{
    ExecOutcome, ManagedPodStore, PodApi, ProgressReporter, ReachabilityCheck,
};
use crate::application::services::auto_terminate::{TerminationHandle, schedule_termination};
use crate::application::services::readiness::{
    ReadinessConfig, wait_until_reachable, wait_until_running,
};
use crate::application::services::registry::terminate_and_forget;
use crate::domain::workload::{WorkloadRun, auto_termination_at};
use crate::domain::{PodError, ResourceSpec};

pub struct WorkloadOptions<'a, R: ProgressReporter> {
    pub reporter: &'a R,
    pub spec: &'a ResourceSpec,
    /// Lifetime of the pod before the auto-termination timer fires.
    pub timeout_minutes: u64,
    pub readiness: ReadinessConfig,
}

/// A finished workload plus its still-armed auto-termination timer.
pub struct Workload {
    pub run: WorkloadRun,
    /// What the action returned; output is empty unless it was captured.
    pub output: ExecOutcome,
    pub timer: TerminationHandle,
}

/// Run `action` on a freshly created pod.
///
/// `action` receives the pod id once the pod answers over SSH and returns the
/// workload's outcome, whose exit code becomes the run's. Errors from `action` propagate without terminating
/// the pod; the auto-termination timer (or the exit guard) takes care of it.
///
/// # Errors
///
/// - `PodError::Provision` if the provider returns no pod. Nothing is
///   registered and no timer is armed.
/// - `PodError::NotReady` / `PodError::SshUnavailable` if a readiness wait
///   times out. The pod is terminated and unregistered first.
/// - Whatever `action` returns.
pub async fn run_ephemeral_workload<A, S, F, Fut>(
    api: &Arc<A>,
    registry: &Arc<S>,
    reachability: &impl ReachabilityCheck,
    opts: WorkloadOptions<'_, impl ProgressReporter>,
    action: F,
) -> Result<Workload>
where
    A: PodApi + 'static,
    S: ManagedPodStore + 'static,
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<ExecOutcome>>,
{
    let WorkloadOptions {
        reporter,
        spec,
        timeout_minutes,
        readiness,
    } = opts;

    // Step 1: create.
    reporter.step(&format!(
        "creating pod ({}x {})...",
        spec.gpu_count, spec.gpu_type
    ));
    let created_at = Utc::now();
    let pod = match api.create_pod(spec).await {
        Ok(Some(pod)) => pod,
        Ok(None) => {
            return Err(PodError::Provision(format!(
                "no {} available for {}x request",
                spec.gpu_type, spec.gpu_count
            ))
            .into());
        }
        Err(e) => return Err(PodError::Provision(format!("{e:#}")).into()),
    };
    let pod_id = pod.id;
    reporter.success(&format!("pod {pod_id} created"));

    // Step 2: register before anything else can fail.
    if let Err(e) = registry.register(&pod_id) {
        tracing::error!(pod_id = %pod_id, error = %format!("{e:#}"), "registering pod failed");
        if let Err(te) = api.terminate_pod(&pod_id).await {
            tracing::warn!(pod_id = %pod_id, error = %format!("{te:#}"), "cleanup terminate failed");
            reporter.warn(&format!("could not terminate pod {pod_id}: {te:#}"));
        }
        return Err(e.context(format!("registering pod {pod_id}")));
    }

    // Step 3: arm the timer.
    let mut timer = schedule_termination(api.clone(), registry.clone(), &pod_id, timeout_minutes);

    // Step 4: wait for RUNNING.
    reporter.step("waiting for pod to start...");
    if !wait_until_running(
        api.as_ref(),
        &pod_id,
        readiness.running_timeout,
        readiness.interval,
    )
    .await
    {
        let err = PodError::NotReady { pod_id };
        return Err(rollback(api.as_ref(), registry.as_ref(), &mut timer, reporter, err).await);
    }
    reporter.success("pod running");

    // Step 5: wait for SSH.
    reporter.step("waiting for SSH...");
    if !wait_until_reachable(reachability, &pod_id, readiness.ssh_timeout, readiness.interval).await {
        let err = PodError::SshUnavailable { pod_id };
        return Err(rollback(api.as_ref(), registry.as_ref(), &mut timer, reporter, err).await);
    }
    reporter.success("SSH ready");

    // Step 6: run the action.
    let output = action(pod_id.clone()).await?;

    Ok(Workload {
        run: WorkloadRun {
            pod_id,
            exit_code: output.exit_code,
            auto_termination_at: auto_termination_at(created_at, timeout_minutes),
            stdout: None,
            stderr: None,
        },
        output,
        timer,
    })
}

/// Best-effort terminate after a setup failure. Returns the original error.
async fn rollback(
    api: &impl PodApi,
    registry: &impl ManagedPodStore,
    timer: &mut TerminationHandle,
    reporter: &impl ProgressReporter,
    err: PodError,
) -> anyhow::Error {
    let pod_id = err.pod_id().unwrap_or_default().to_string();
    reporter.warn(&format!("{err} Terminating pod {pod_id}..."));
    timer.cancel();
    match terminate_and_forget(api, registry, &pod_id).await {
        Ok(()) => reporter.success(&format!("pod {pod_id} terminated")),
        Err(e) => {
            tracing::warn!(pod_id = %pod_id, error = %format!("{e:#}"), "rollback terminate failed");
            reporter.warn(&format!(
                "could not terminate pod {pod_id}: {e:#}. It stays registered; run: podctl kill --all"
            ));
        }
    }
    err.into()
}
