//! `podctl whoami`: account behind the configured API key.

use anyhow::Result;
use std::process::ExitCode;

use crate::app::AppContext;
use crate::application::ports::PodApi;

/// # Errors
///
/// Returns an error if the provider call fails.
pub async fn run(app: &AppContext, api: &impl PodApi) -> Result<ExitCode> {
    let user = api.user_info().await?;
    app.renderer().user(&user)?;
    Ok(ExitCode::SUCCESS)
}
