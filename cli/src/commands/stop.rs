//! `podctl stop`: stop a running pod, keeping its volume.

use anyhow::Result;
use std::process::ExitCode;

use crate::app::AppContext;
use crate::application::ports::PodApi;
use crate::application::services::pod_admin;

/// Run `podctl stop`.
///
/// # Errors
///
/// Returns an error if the pod does not exist or cannot be stopped.
pub async fn run(app: &AppContext, api: &impl PodApi, pod_id: &str) -> Result<ExitCode> {
    let pod = pod_admin::stop_pod(api, pod_id).await?;
    app.renderer().pod("stopped", &pod)?;
    app.output.info(&format!("Resume: podctl start {pod_id}"));
    Ok(ExitCode::SUCCESS)
}
