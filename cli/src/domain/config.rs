//! Domain types and validators for podctl configuration and presets.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_API_URL: &str = "https://api.runpod.io/graphql";
pub const DEFAULT_GPU_TYPE: &str = "NVIDIA GeForce RTX 4090";
pub const DEFAULT_IMAGE: &str = "runpod/pytorch:2.1.0-py3.10-cuda11.8.0-devel-ubuntu22.04";
pub const DEFAULT_GPU_COUNT: u32 = 1;
pub const DEFAULT_CONTAINER_DISK_GB: u32 = 20;
pub const DEFAULT_VOLUME_GB: u32 = 0;
pub const DEFAULT_TIMEOUT_MINUTES: u64 = 60;

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "api_key",
    "api_url",
    "gpu_type",
    "gpu_count",
    "image",
    "container_disk_gb",
    "volume_gb",
    "timeout_minutes",
    "team_id",
];

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.podctl/config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PodctlConfig {
    /// Provider API key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// GraphQL endpoint override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Default resource settings applied to every workload.
    pub defaults: ResourceOverrides,
}

impl PodctlConfig {
    /// API endpoint, falling back to the public provider endpoint.
    #[must_use]
    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }
}

/// A partial resource specification. Used for config defaults, presets, and
/// per-invocation options alike.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_disk_gb: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_gb: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_minutes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
}

impl ResourceOverrides {
    /// Layer `self` over `base`: every field set in `self` wins.
    #[must_use]
    pub fn over(self, base: Self) -> Self {
        Self {
            gpu_type: self.gpu_type.or(base.gpu_type),
            gpu_count: self.gpu_count.or(base.gpu_count),
            image: self.image.or(base.image),
            container_disk_gb: self.container_disk_gb.or(base.container_disk_gb),
            volume_gb: self.volume_gb.or(base.volume_gb),
            timeout_minutes: self.timeout_minutes.or(base.timeout_minutes),
            team_id: self.team_id.or(base.team_id),
        }
    }

    /// `true` when no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Named presets stored in `~/.podctl/presets.yaml`.
pub type Presets = BTreeMap<String, ResourceOverrides>;

/// Fully resolved resources for one pod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceSpec {
    pub gpu_type: String,
    pub gpu_count: u32,
    pub image: String,
    pub container_disk_gb: u32,
    pub volume_gb: u32,
    pub team_id: Option<String>,
}

impl Default for ResourceSpec {
    fn default() -> Self {
        Self {
            gpu_type: DEFAULT_GPU_TYPE.to_string(),
            gpu_count: DEFAULT_GPU_COUNT,
            image: DEFAULT_IMAGE.to_string(),
            container_disk_gb: DEFAULT_CONTAINER_DISK_GB,
            volume_gb: DEFAULT_VOLUME_GB,
            team_id: None,
        }
    }
}

/// Resources plus the auto-termination timeout, after merging every layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSpec {
    pub resources: ResourceSpec,
    pub timeout_minutes: u64,
}

/// Merge the four precedence layers, low to high:
/// built-in defaults < config defaults < preset < explicit options.
#[must_use]
pub fn resolve_spec(
    config_defaults: &ResourceOverrides,
    preset: Option<&ResourceOverrides>,
    explicit: &ResourceOverrides,
) -> ResolvedSpec {
    let mut layered = config_defaults.clone();
    if let Some(p) = preset {
        layered = p.clone().over(layered);
    }
    let merged = explicit.clone().over(layered);

    let builtin = ResourceSpec::default();
    ResolvedSpec {
        resources: ResourceSpec {
            gpu_type: merged.gpu_type.unwrap_or(builtin.gpu_type),
            gpu_count: merged.gpu_count.unwrap_or(builtin.gpu_count),
            image: merged.image.unwrap_or(builtin.image),
            container_disk_gb: merged.container_disk_gb.unwrap_or(builtin.container_disk_gb),
            volume_gb: merged.volume_gb.unwrap_or(builtin.volume_gb),
            team_id: merged.team_id.or(builtin.team_id),
        },
        timeout_minutes: merged.timeout_minutes.unwrap_or(DEFAULT_TIMEOUT_MINUTES),
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    let invalid = |expected: &str| -> anyhow::Error {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
        .into()
    };
    match key {
        "gpu_count" | "container_disk_gb" | "timeout_minutes" => match value.parse::<u64>() {
            Ok(n) if n > 0 => Ok(()),
            _ => Err(invalid("a positive integer")),
        },
        "volume_gb" => value
            .parse::<u32>()
            .map(|_| ())
            .map_err(|_| invalid("a non-negative integer")),
        "api_url" if !(value.starts_with("https://") || value.starts_with("http://")) => {
            Err(invalid("an http(s) URL"))
        }
        _ if value.trim().is_empty() => Err(invalid("a non-empty value")),
        _ => Ok(()),
    }
}

/// Apply a validated key/value pair to `config`.
///
/// # Errors
///
/// Returns an error if the key or value is invalid.
pub fn apply_config_value(config: &mut PodctlConfig, key: &str, value: &str) -> Result<()> {
    validate_config_key(key)?;
    validate_config_value(key, value)?;
    let d = &mut config.defaults;
    match key {
        "api_key" => config.api_key = Some(value.trim().to_string()),
        "api_url" => config.api_url = Some(value.to_string()),
        "gpu_type" => d.gpu_type = Some(value.to_string()),
        "gpu_count" => d.gpu_count = Some(value.parse()?),
        "image" => d.image = Some(value.to_string()),
        "container_disk_gb" => d.container_disk_gb = Some(value.parse()?),
        "volume_gb" => d.volume_gb = Some(value.parse()?),
        "timeout_minutes" => d.timeout_minutes = Some(value.parse()?),
        "team_id" => d.team_id = Some(value.to_string()),
        _ => anyhow::bail!("Unknown setting: {key}"),
    }
    Ok(())
}

/// Mask an API key for display, keeping the last four characters.
#[must_use]
pub fn mask_secret(secret: &str) -> String {
    let tail: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("****{tail}")
    }
}

/// Validates a preset name.
///
/// # Errors
///
/// Returns an error if the name does not match `^[a-z0-9][a-z0-9_-]{0,31}$`.
pub fn validate_preset_name(name: &str) -> Result<()> {
    let re = regex::Regex::new(r"^[a-z0-9][a-z0-9_-]{0,31}$")?;
    anyhow::ensure!(
        re.is_match(name),
        ConfigError::InvalidPresetName(name.to_string())
    );
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
