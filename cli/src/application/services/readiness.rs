//! Readiness poller: wait until a pod is RUNNING, then until SSH answers.
//!
//! Both waits share one state machine. Each tick queries the current state;
//! satisfied means READY, otherwise the deadline decides between TIMED_OUT
//! and another sleep. Time is read from the tokio clock so paused-time tests
//! drive it deterministically.

use std::time::Duration;

use tokio::time::Instant;

use crate::application::ports::{PodApi, ReachabilityCheck};

/// Default deadline for the RUNNING wait.
pub const RUNNING_TIMEOUT: Duration = Duration::from_secs(300);
/// Default deadline for the SSH wait.
pub const SSH_TIMEOUT: Duration = Duration::from_secs(120);
/// Fixed interval between checks.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Deadlines and cadence for both waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessConfig {
    pub running_timeout: Duration,
    pub ssh_timeout: Duration,
    pub interval: Duration,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            running_timeout: RUNNING_TIMEOUT,
            ssh_timeout: SSH_TIMEOUT,
            interval: POLL_INTERVAL,
        }
    }
}

/// Terminal state of a wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Waiting,
    Ready,
    TimedOut,
}

/// Drive `check` until it reports ready or `timeout` elapses.
///
/// Returns `true` for READY, `false` for TIMED_OUT. Never errors.
pub async fn poll_until<F, Fut>(mut check: F, timeout: Duration, interval: Duration) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let start = Instant::now();
    let mut state = PollState::Waiting;
    while state == PollState::Waiting {
        state = if check().await {
            PollState::Ready
        } else if start.elapsed() >= timeout {
            PollState::TimedOut
        } else {
            tokio::time::sleep(interval).await;
            PollState::Waiting
        };
    }
    state == PollState::Ready
}

/// Wait until the provider reports the pod as RUNNING.
///
/// Lookup errors and a missing pod count as "not yet".
pub async fn wait_until_running(
    api: &impl PodApi,
    pod_id: &str,
    timeout: Duration,
    interval: Duration,
) -> bool {
    poll_until(
        move || async move {
            match api.get_pod(pod_id).await {
                Ok(Some(pod)) => {
                    tracing::debug!(pod_id, status = %pod.desired_status, "pod status");
                    pod.is_running()
                }
                Ok(None) => false,
                Err(e) => {
                    tracing::debug!(pod_id, error = %e, "status query failed");
                    false
                }
            }
        },
        timeout,
        interval,
    )
    .await
}

/// Wait until a trivial SSH command succeeds on the pod.
pub async fn wait_until_reachable(
    reachability: &impl ReachabilityCheck,
    pod_id: &str,
    timeout: Duration,
    interval: Duration,
) -> bool {
    poll_until(move || reachability.is_reachable(pod_id), timeout, interval).await
}
