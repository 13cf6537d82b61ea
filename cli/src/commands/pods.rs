//! `podctl pods`: list every pod on the account.

use anyhow::Result;
use std::process::ExitCode;

use crate::app::AppContext;
use crate::application::ports::PodApi;
use crate::application::services::pod_admin;

/// # Errors
///
/// Returns an error if the provider call fails.
pub async fn run(app: &AppContext, api: &impl PodApi) -> Result<ExitCode> {
    let pods = pod_admin::list_pods(api).await?;
    app.renderer().pods(&pods)?;
    Ok(ExitCode::SUCCESS)
}
