//! Tests for the auto-termination timer.

#![allow(clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use podctl::application::services::auto_terminate::{TimerOutcome, schedule_termination};
use podctl::domain::PodStatus;

use crate::mocks::{InMemoryProvider, SetRegistry, pod};

const POD: &str = "pod-a";

fn live_pod() -> Arc<InMemoryProvider> {
    Arc::new(InMemoryProvider::without_capacity().with_pod(pod(POD, PodStatus::Running)))
}

#[tokio::test(start_paused = true)]
async fn fires_after_delay_and_unregisters() {
    let api = live_pod();
    let registry = Arc::new(SetRegistry::with(&[POD]));
    let handle = schedule_termination(api.clone(), registry.clone(), POD, 1);

    tokio::time::sleep(Duration::from_secs(59)).await;
    assert!(api.terminated().is_empty(), "must not fire early");

    assert_eq!(handle.join().await, TimerOutcome::Terminated);
    assert_eq!(api.terminated(), vec![POD.to_string()]);
    assert!(registry.ids().is_empty());
}

#[tokio::test(start_paused = true)]
async fn missing_pod_is_a_no_op() {
    let api = Arc::new(InMemoryProvider::without_capacity());
    let registry = Arc::new(SetRegistry::with(&["gone"]));
    let handle = schedule_termination(api.clone(), registry.clone(), "gone", 1);
    assert_eq!(handle.join().await, TimerOutcome::AlreadyGone);
    assert_eq!(api.terminate_attempts(), 0);
    assert!(registry.ids().is_empty());
}

#[tokio::test(start_paused = true)]
async fn missing_pod_with_unwritable_registry_is_still_already_gone() {
    let api = Arc::new(InMemoryProvider::without_capacity());
    let registry = Arc::new(SetRegistry::with(&["gone"]).failing_unregister());
    let handle = schedule_termination(api.clone(), registry.clone(), "gone", 1);
    assert_eq!(handle.join().await, TimerOutcome::AlreadyGone);
    assert_eq!(api.terminate_attempts(), 0);
    assert_eq!(registry.ids(), vec!["gone".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn terminate_failure_is_reported_as_failed() {
    let api = Arc::new(
        InMemoryProvider::without_capacity()
            .with_pod(pod(POD, PodStatus::Running))
            .failing_terminate_for(POD),
    );
    let registry = Arc::new(SetRegistry::with(&[POD]));
    let handle = schedule_termination(api, registry.clone(), POD, 1);
    let TimerOutcome::Failed(message) = handle.join().await else {
        panic!("expected a failed outcome");
    };
    assert!(message.contains("rejected terminate"), "{message}");
    assert_eq!(registry.ids(), vec![POD.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn cancel_prevents_termination() {
    let api = live_pod();
    let registry = Arc::new(SetRegistry::with(&[POD]));
    let mut handle = schedule_termination(api.clone(), registry, POD, 5);
    handle.cancel();
    assert_eq!(handle.join().await, TimerOutcome::Cancelled);
    assert_eq!(api.gets(), 0);
    assert_eq!(api.terminate_attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn dropping_handle_keeps_timer_alive() {
    let api = live_pod();
    let registry = Arc::new(SetRegistry::with(&[POD]));
    drop(schedule_termination(api.clone(), registry, POD, 1));
    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(api.terminated(), vec![POD.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn deadline_is_minutes_from_now() {
    let api = Arc::new(InMemoryProvider::without_capacity());
    let registry = Arc::new(SetRegistry::default());
    let before = Utc::now();
    let mut handle = schedule_termination(api, registry, "p", 10);
    assert_eq!(handle.pod_id(), "p");
    let secs = (handle.deadline() - before).num_seconds();
    assert!((599..=601).contains(&secs), "got {secs}");
    handle.cancel();
}
