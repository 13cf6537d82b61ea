//! Application service: configuration and preset use-cases.

use anyhow::{Context, Result};

use crate::application::ports::{ConfigStore, PresetStore};
use crate::domain::config::{apply_config_value, resolve_spec, validate_preset_name};
use crate::domain::{ConfigError, PodctlConfig, Presets, ResolvedSpec, ResourceOverrides};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "PODCTL_API_KEY";

/// Load configuration.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed.
pub fn load_config(store: &impl ConfigStore) -> Result<PodctlConfig> {
    store.load()
}

/// Validate and persist one setting. Returns the updated configuration.
///
/// # Errors
///
/// Returns `ConfigError::UnknownKey` / `ConfigError::InvalidValue` for bad
/// input, or an I/O error if the file cannot be written.
pub fn set_config_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<PodctlConfig> {
    let mut config = store.load()?;
    apply_config_value(&mut config, key, value)?;
    store.save(&config)?;
    tracing::debug!(key, "config updated");
    Ok(config)
}

/// Pick the API key: a non-empty `env_override` wins over the stored key.
///
/// # Errors
///
/// Returns `ConfigError::MissingApiKey` when neither source has a key.
pub fn resolve_api_key(config: &PodctlConfig, env_override: Option<String>) -> Result<String> {
    env_override
        .filter(|k| !k.trim().is_empty())
        .or_else(|| config.api_key.clone().filter(|k| !k.trim().is_empty()))
        .map(|k| k.trim().to_string())
        .ok_or_else(|| ConfigError::MissingApiKey.into())
}

/// Merge built-in defaults, config defaults, the named preset, and explicit
/// options into the spec a workload runs with.
///
/// # Errors
///
/// Returns `ConfigError::UnknownPreset` if `preset` names a missing preset.
pub fn resolve_workload_spec(
    config: &PodctlConfig,
    presets: &impl PresetStore,
    preset: Option<&str>,
    explicit: &ResourceOverrides,
) -> Result<ResolvedSpec> {
    let loaded;
    let preset = match preset {
        Some(name) => {
            loaded = presets.load().context("loading presets")?;
            Some(
                loaded
                    .get(name)
                    .ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))?,
            )
        }
        None => None,
    };
    Ok(resolve_spec(&config.defaults, preset, explicit))
}

// ── Presets ──────────────────────────────────────────────────────────────────

/// All presets, sorted by name.
///
/// # Errors
///
/// Returns an error if the presets file cannot be read.
pub fn list_presets(store: &impl PresetStore) -> Result<Presets> {
    store.load()
}

/// One preset by name.
///
/// # Errors
///
/// Returns `ConfigError::UnknownPreset` if it does not exist.
pub fn get_preset(store: &impl PresetStore, name: &str) -> Result<ResourceOverrides> {
    store
        .load()?
        .remove(name)
        .ok_or_else(|| ConfigError::UnknownPreset(name.to_string()).into())
}

/// Create or replace a preset. Returns `true` if an existing preset was replaced.
///
/// # Errors
///
/// Returns `ConfigError::InvalidPresetName` for a bad name, or an I/O error.
pub fn save_preset(
    store: &impl PresetStore,
    name: &str,
    overrides: ResourceOverrides,
) -> Result<bool> {
    validate_preset_name(name)?;
    let mut presets = store.load()?;
    let replaced = presets.insert(name.to_string(), overrides).is_some();
    store.save(&presets)?;
    Ok(replaced)
}

/// Delete a preset.
///
/// # Errors
///
/// Returns `ConfigError::UnknownPreset` if it does not exist.
pub fn delete_preset(store: &impl PresetStore, name: &str) -> Result<()> {
    let mut presets = store.load()?;
    if presets.remove(name).is_none() {
        return Err(ConfigError::UnknownPreset(name.to_string()).into());
    }
    store.save(&presets)
}
