//! `podctl gpus`: GPU types offered by the provider.

use anyhow::{Context, Result};
use std::process::ExitCode;

use crate::app::AppContext;
use crate::application::ports::PodApi;

/// # Errors
///
/// Returns an error if the provider call fails.
pub async fn run(app: &AppContext, api: &impl PodApi) -> Result<ExitCode> {
    let mut gpus = api.gpu_types().await.context("listing GPU types")?;
    gpus.sort_by(|a, b| {
        b.memory_in_gb
            .cmp(&a.memory_in_gb)
            .then_with(|| a.display_name.cmp(&b.display_name))
    });
    app.renderer().gpus(&gpus)?;
    Ok(ExitCode::SUCCESS)
}
