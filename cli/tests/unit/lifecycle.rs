//! End-to-end lifecycle scenarios: orchestrator, auto-termination timer, and
//! exit guard working against the same provider and registry.

#![allow(clippy::expect_used)]

use std::future::{pending, ready};
use std::sync::Arc;
use std::time::Duration;

use podctl::application::ports::{ExecOutcome, ManagedPodStore, PodApi};
use podctl::application::services::auto_terminate::TimerOutcome;
use podctl::application::services::exit_guard::{ExitGuard, Guarded};
use podctl::application::services::orchestrator::{WorkloadOptions, run_ephemeral_workload};
use podctl::application::services::readiness::ReadinessConfig;
use podctl::domain::{PodStatus, ResourceSpec};

use crate::mocks::{InMemoryProvider, Reachable, RecordingReporter, SetRegistry, pod};

fn fast_readiness() -> ReadinessConfig {
    ReadinessConfig {
        running_timeout: Duration::from_secs(30),
        ssh_timeout: Duration::from_secs(30),
        interval: Duration::from_secs(5),
    }
}

fn options<'a>(
    reporter: &'a RecordingReporter,
    spec: &'a ResourceSpec,
    timeout_minutes: u64,
) -> WorkloadOptions<'a, RecordingReporter> {
    WorkloadOptions {
        reporter,
        spec,
        timeout_minutes,
        readiness: fast_readiness(),
    }
}

#[tokio::test(start_paused = true)]
async fn workload_then_exit_guard_leaves_nothing_behind() {
    let api = Arc::new(InMemoryProvider::creating(PodStatus::Running));
    let registry = Arc::new(SetRegistry::default());
    let reporter = RecordingReporter::default();
    let spec = ResourceSpec::default();

    let guard = ExitGuard::acquire(api.clone(), registry.clone());
    let command = async {
        let workload = run_ephemeral_workload(
            &api,
            &registry,
            &Reachable(true),
            options(&reporter, &spec, 60),
            |_| async { Ok::<_, anyhow::Error>(ExecOutcome::exited(3)) },
        )
        .await?;
        assert_eq!(registry.ids(), vec![workload.run.pod_id.clone()]);
        Ok::<_, anyhow::Error>(workload.run)
    };

    let Guarded::Finished(result) = guard.run(command, pending(), &reporter).await else {
        panic!("command should finish before shutdown");
    };
    let run = result.expect("workload ok");
    assert_eq!(run.exit_code, 3);
    assert_eq!(api.terminated(), vec![run.pod_id]);
    assert!(registry.ids().is_empty());
    assert!(api.live_ids().is_empty());
}

#[tokio::test(start_paused = true)]
async fn timer_terminates_pod_at_deadline_without_exit_guard() {
    let api = Arc::new(InMemoryProvider::creating(PodStatus::Running));
    let registry = Arc::new(SetRegistry::default());
    let reporter = RecordingReporter::default();
    let spec = ResourceSpec::default();

    let workload = run_ephemeral_workload(
        &api,
        &registry,
        &Reachable(true),
        options(&reporter, &spec, 1),
        |_| async { Ok::<_, anyhow::Error>(ExecOutcome::exited(0)) },
    )
    .await
    .expect("workload ok");

    assert_eq!(registry.ids(), vec![workload.run.pod_id.clone()]);
    assert_eq!(workload.timer.join().await, TimerOutcome::Terminated);
    assert!(registry.ids().is_empty());
    assert!(api.live_ids().is_empty());
}

#[tokio::test(start_paused = true)]
async fn pod_killed_elsewhere_makes_timer_a_noop() {
    let api = Arc::new(InMemoryProvider::creating(PodStatus::Running));
    let registry = Arc::new(SetRegistry::default());
    let reporter = RecordingReporter::default();
    let spec = ResourceSpec::default();

    let workload = run_ephemeral_workload(
        &api,
        &registry,
        &Reachable(true),
        options(&reporter, &spec, 1),
        |_| async { Ok::<_, anyhow::Error>(ExecOutcome::exited(0)) },
    )
    .await
    .expect("workload ok");

    api.terminate_pod(&workload.run.pod_id)
        .await
        .expect("terminate");
    assert_eq!(workload.timer.join().await, TimerOutcome::AlreadyGone);
    assert_eq!(api.terminated().len(), 1);
}

#[tokio::test]
async fn interrupt_cleans_up_every_managed_pod() {
    let api = Arc::new(
        InMemoryProvider::without_capacity()
            .with_pod(pod("a", PodStatus::Running))
            .with_pod(pod("b", PodStatus::Running))
            .with_pod(pod("unmanaged", PodStatus::Running)),
    );
    let registry = Arc::new(SetRegistry::with(&["a", "b"]));
    let reporter = RecordingReporter::default();

    let guard = ExitGuard::acquire(api.clone(), registry.clone());
    let outcome = guard
        .run(pending::<anyhow::Result<()>>(), ready(()), &reporter)
        .await;

    assert!(matches!(outcome, Guarded::Interrupted));
    assert!(registry.ids().is_empty());
    assert_eq!(
        api.live_ids().into_iter().collect::<Vec<_>>(),
        vec!["unmanaged".to_string()]
    );
}

#[tokio::test]
async fn release_reports_failures_and_keeps_the_id() {
    let api = Arc::new(
        InMemoryProvider::without_capacity()
            .with_pod(pod("a", PodStatus::Running))
            .with_pod(pod("b", PodStatus::Running))
            .failing_terminate_for("a"),
    );
    let registry = Arc::new(SetRegistry::with(&["a", "b"]));
    let reporter = RecordingReporter::default();

    ExitGuard::acquire(api.clone(), registry.clone())
        .release(&reporter)
        .await;

    assert_eq!(registry.ids(), vec!["a".to_string()]);
    assert_eq!(api.terminated(), vec!["b".to_string()]);
    let warnings = reporter.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("pod a"), "got: {warnings:?}");
}

#[tokio::test(start_paused = true)]
async fn concurrent_workloads_keep_independent_timers() {
    let api = Arc::new(InMemoryProvider::creating(PodStatus::Running));
    let registry = Arc::new(SetRegistry::default());
    let reporter = RecordingReporter::default();
    let spec = ResourceSpec::default();

    let short = run_ephemeral_workload(
        &api,
        &registry,
        &Reachable(true),
        options(&reporter, &spec, 1),
        |_| async { Ok::<_, anyhow::Error>(ExecOutcome::exited(0)) },
    )
    .await
    .expect("short");
    let mut long = run_ephemeral_workload(
        &api,
        &registry,
        &Reachable(true),
        options(&reporter, &spec, 60),
        |_| async { Ok::<_, anyhow::Error>(ExecOutcome::exited(0)) },
    )
    .await
    .expect("long");

    assert_eq!(registry.list().expect("list").len(), 2);
    assert_eq!(short.timer.join().await, TimerOutcome::Terminated);
    assert_eq!(registry.ids(), vec![long.run.pod_id.clone()]);

    long.timer.cancel();
    assert_eq!(long.timer.join().await, TimerOutcome::Cancelled);
    assert_eq!(registry.ids(), vec![long.run.pod_id.clone()]);
}
