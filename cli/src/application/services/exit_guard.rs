//! Process-exit cleanup guard.
//!
//! The dispatcher acquires an `ExitGuard` before running any command that
//! talks to the provider and always releases it, whether the command
//! finished, failed, or lost the race against a shutdown signal. Releasing
//! terminates every pod in the managed-pod registry.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;

use crate::application::ports::{ManagedPodStore, PodApi, ProgressReporter};
use crate::application::services::registry::terminate_all_managed;

/// How a guarded command ended.
#[derive(Debug)]
pub enum Guarded<T> {
    /// The command ran to completion (successfully or not).
    Finished(Result<T>),
    /// A shutdown signal arrived first; the command future was dropped.
    Interrupted,
}

/// Scoped owner of "terminate all managed pods on exit".
pub struct ExitGuard<A, S> {
    api: Arc<A>,
    registry: Arc<S>,
}

impl<A: PodApi, S: ManagedPodStore> ExitGuard<A, S> {
    #[must_use]
    pub fn acquire(api: Arc<A>, registry: Arc<S>) -> Self {
        Self { api, registry }
    }

    /// Race `command` against `shutdown`, then release the guard.
    pub async fn run<T>(
        self,
        command: impl Future<Output = Result<T>>,
        shutdown: impl Future<Output = ()>,
        reporter: &impl ProgressReporter,
    ) -> Guarded<T> {
        let outcome = tokio::select! {
            result = command => Guarded::Finished(result),
            () = shutdown => {
                reporter.warn("interrupted, cleaning up managed pods...");
                Guarded::Interrupted
            }
        };
        self.release(reporter).await;
        outcome
    }

    /// Terminate every managed pod. Failures are reported, never returned.
    pub async fn release(self, reporter: &impl ProgressReporter) {
        match terminate_all_managed(self.api.as_ref(), self.registry.as_ref(), reporter).await {
            Ok(0) => {}
            Ok(n) => tracing::info!(attempted = n, "exit cleanup finished"),
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "exit cleanup could not read registry");
                reporter.warn(&format!("exit cleanup skipped: {e:#}"));
            }
        }
    }
}
