//! Auto-termination timer.
//!
//! A spawned task sleeps for the configured lifetime, then terminates the pod
//! unless it is already gone or the timer was cancelled. Several timers may
//! run at once; each owns its own task and cancel channel.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::application::ports::{ManagedPodStore, PodApi};
use crate::application::services::registry::terminate_and_forget;

/// What the timer did when its task finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerOutcome {
    /// Pod was terminated by the timer.
    Terminated,
    /// Pod no longer existed when the timer fired.
    AlreadyGone,
    /// Timer was cancelled before firing.
    Cancelled,
    /// Lookup or terminate failed; the message is the error chain.
    Failed(String),
}

/// Handle to a scheduled termination.
///
/// Dropping the handle leaves the timer running; only `cancel` stops it.
pub struct TerminationHandle {
    pod_id: String,
    deadline: DateTime<Utc>,
    cancel: Option<oneshot::Sender<()>>,
    task: JoinHandle<TimerOutcome>,
}

impl TerminationHandle {
    #[must_use]
    pub fn pod_id(&self) -> &str {
        &self.pod_id
    }

    /// Wall-clock time the timer fires.
    #[must_use]
    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// Stop the timer. A no-op if it already fired.
    pub fn cancel(&mut self) {
        if let Some(tx) = self.cancel.take() {
            let _ = tx.send(());
        }
    }

    /// Wait for the timer task to finish.
    pub async fn join(self) -> TimerOutcome {
        self.task
            .await
            .unwrap_or_else(|e| TimerOutcome::Failed(format!("timer task failed: {e}")))
    }
}

/// Terminate `pod_id` after `minutes` minutes.
#[must_use]
pub fn schedule_termination<A, S>(
    api: Arc<A>,
    registry: Arc<S>,
    pod_id: &str,
    minutes: u64,
) -> TerminationHandle
where
    A: PodApi + 'static,
    S: ManagedPodStore + 'static,
{
    schedule_termination_after(
        api,
        registry,
        pod_id,
        Duration::from_secs(minutes.saturating_mul(60)),
    )
}

/// Terminate `pod_id` after `delay`.
#[must_use]
pub fn schedule_termination_after<A, S>(
    api: Arc<A>,
    registry: Arc<S>,
    pod_id: &str,
    delay: Duration,
) -> TerminationHandle
where
    A: PodApi + 'static,
    S: ManagedPodStore + 'static,
{
    let (tx, rx) = oneshot::channel::<()>();
    let deadline = chrono::Duration::from_std(delay)
        .ok()
        .and_then(|d| Utc::now().checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    let id = pod_id.to_string();

    tracing::debug!(pod_id, %deadline, "auto-termination scheduled");
    let task = tokio::spawn(async move {
        tokio::select! {
            () = tokio::time::sleep(delay) => fire(api.as_ref(), registry.as_ref(), &id).await,
            Ok(()) = rx => {
                tracing::debug!(pod_id = %id, "auto-termination cancelled");
                TimerOutcome::Cancelled
            }
        }
    });

    TerminationHandle {
        pod_id: pod_id.to_string(),
        deadline,
        cancel: Some(tx),
        task,
    }
}

async fn fire(api: &impl PodApi, registry: &impl ManagedPodStore, pod_id: &str) -> TimerOutcome {
    match api.get_pod(pod_id).await {
        Ok(None) => {
            tracing::info!(pod_id, "auto-termination: pod already gone");
            if let Err(e) = registry.unregister(pod_id) {
                tracing::warn!(pod_id, error = %format!("{e:#}"), "unregistering vanished pod failed");
            }
            TimerOutcome::AlreadyGone
        }
        Ok(Some(_)) => match terminate_and_forget(api, registry, pod_id).await {
            Ok(()) => {
                tracing::info!(pod_id, "auto-termination fired");
                TimerOutcome::Terminated
            }
            Err(e) => {
                tracing::warn!(pod_id, error = %format!("{e:#}"), "auto-termination failed");
                TimerOutcome::Failed(format!("{e:#}"))
            }
        },
        Err(e) => {
            tracing::warn!(pod_id, error = %format!("{e:#}"), "auto-termination lookup failed");
            TimerOutcome::Failed(format!("{e:#}"))
        }
    }
}
