//! `podctl managed`: list ids in the managed-pod registry.

use anyhow::Result;
use std::process::ExitCode;

use crate::app::AppContext;
use crate::application::ports::ManagedPodStore;

/// # Errors
///
/// Returns an error if the registry file cannot be read.
pub fn run(app: &AppContext) -> Result<ExitCode> {
    let ids = app.registry.list()?;
    app.renderer().managed(&ids)?;
    Ok(ExitCode::SUCCESS)
}
