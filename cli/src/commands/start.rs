//! `podctl start`: resume a stopped pod.

use anyhow::Result;
use std::process::ExitCode;

use crate::app::AppContext;
use crate::application::ports::PodApi;
use crate::application::services::pod_admin;

/// Run `podctl start`.
///
/// # Errors
///
/// Returns an error if the pod does not exist or cannot be resumed.
pub async fn run(app: &AppContext, api: &impl PodApi, pod_id: &str) -> Result<ExitCode> {
    let pod = pod_admin::start_pod(api, pod_id).await?;
    app.renderer().pod("resumed", &pod)?;
    Ok(ExitCode::SUCCESS)
}
