//! JSON output helpers.
//!
//! Every `--json` code path prints exactly one JSON document on stdout.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::config::mask_secret;
use crate::domain::{PodError, PodctlConfig};

/// Format a JSON error object.
///
/// ```json
/// { "error": true, "message": "...", "code": "..." }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Machine-readable code for a failed command.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    if let Some(pod) = err.downcast_ref::<PodError>() {
        return pod.code();
    }
    if err.downcast_ref::<crate::domain::ConfigError>().is_some() {
        return "config_error";
    }
    "command_failed"
}

/// Pretty-print `value` to stdout.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
    println!("{out}");
    Ok(())
}

/// Config as shown to users, with the API key masked.
#[must_use]
pub fn config_view(config: &PodctlConfig, path: &std::path::Path) -> serde_json::Value {
    serde_json::json!({
        "path": path.display().to_string(),
        "api_key": config.api_key.as_deref().map(mask_secret),
        "api_url": config.api_url(),
        "defaults": config.defaults,
    })
}
