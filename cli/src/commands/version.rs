//! Version command

use anyhow::Result;
use std::process::ExitCode;

use crate::app::AppContext;

/// Run the version command.
///
/// # Errors
///
/// JSON serialization failures only.
pub fn run(app: &AppContext) -> Result<ExitCode> {
    app.renderer().version(env!("CARGO_PKG_VERSION"))?;
    Ok(ExitCode::SUCCESS)
}
