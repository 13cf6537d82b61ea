//! `podctl kill`: terminate one pod, or every managed pod.

use anyhow::Result;
use clap::Args;
use std::process::ExitCode;

use crate::app::AppContext;
use crate::application::ports::{ManagedPodStore, PodApi};
use crate::application::services::{pod_admin, registry};
use crate::output::{TerminalReporter, json};

/// Arguments for `podctl kill`.
#[derive(Args)]
pub struct KillArgs {
    /// Pod to terminate
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    pub pod_id: Option<String>,

    /// Terminate every pod in the managed-pod registry
    #[arg(long)]
    pub all: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Run `podctl kill`.
///
/// # Errors
///
/// Returns an error if the pod does not exist, terminate fails, or the
/// registry cannot be read.
pub async fn run(
    app: &AppContext,
    api: &impl PodApi,
    store: &impl ManagedPodStore,
    args: KillArgs,
) -> Result<ExitCode> {
    if args.all {
        return kill_all(app, api, store, args.yes).await;
    }
    let Some(pod_id) = args.pod_id else {
        anyhow::bail!("Specify a pod id or --all");
    };
    pod_admin::kill_pod(api, store, &pod_id).await?;
    if app.is_json() {
        json::print(&serde_json::json!({ "terminated": [pod_id] }))?;
    } else {
        app.output.success(&format!("Pod {pod_id} terminated"));
    }
    Ok(ExitCode::SUCCESS)
}

async fn kill_all(
    app: &AppContext,
    api: &impl PodApi,
    store: &impl ManagedPodStore,
    yes: bool,
) -> Result<ExitCode> {
    let ids = store.list()?;
    if ids.is_empty() {
        if app.is_json() {
            json::print(&serde_json::json!({ "attempted": 0, "remaining": [] }))?;
        } else {
            app.output.info("No managed pods.");
        }
        return Ok(ExitCode::SUCCESS);
    }
    if !yes && !app.is_json() {
        let prompt = format!("Terminate {} managed pod(s)?", ids.len());
        if !app.confirm(&prompt, false)? {
            app.output.info("Aborted.");
            return Ok(ExitCode::SUCCESS);
        }
    }

    let reporter = TerminalReporter::new(&app.output);
    let attempted = registry::terminate_all_managed(api, store, &reporter).await?;
    let remaining = store.list()?;
    if app.is_json() {
        json::print(&serde_json::json!({ "attempted": attempted, "remaining": remaining }))?;
    } else if remaining.is_empty() {
        app.output
            .success(&format!("Terminated {attempted} managed pod(s)"));
    } else {
        app.output.warn(&format!(
            "{} of {attempted} pod(s) could not be terminated and stay registered",
            remaining.len()
        ));
    }
    Ok(if remaining.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
