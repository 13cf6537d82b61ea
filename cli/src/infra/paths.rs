//! Location of podctl's state directory.

use std::path::PathBuf;

use anyhow::Result;

/// Environment variable overriding the state directory.
pub const HOME_ENV: &str = "PODCTL_HOME";

pub const CONFIG_FILE: &str = "config.yaml";
pub const PRESETS_FILE: &str = "presets.yaml";
pub const REGISTRY_FILE: &str = "managed_pods.json";

/// `$PODCTL_HOME`, or `~/.podctl`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn podctl_home() -> Result<PathBuf> {
    if let Ok(val) = std::env::var(HOME_ENV)
        && !val.is_empty()
    {
        return Ok(PathBuf::from(val));
    }
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.join(".podctl"))
}

/// Write `content` to `path` through a temp file and rename.
///
/// Creates the parent directory and restricts the file to the owner on Unix.
///
/// # Errors
///
/// Returns an error if any filesystem step fails.
pub fn write_atomic(path: &std::path::Path, content: &str) -> Result<()> {
    use anyhow::Context;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp_path = PathBuf::from(temp);
    std::fs::write(&temp_path, content)
        .with_context(|| format!("writing temp file {}", temp_path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("setting permissions on {}", temp_path.display()))?;
    }

    std::fs::rename(&temp_path, path)
        .with_context(|| format!("finalizing {}", path.display()))
}
