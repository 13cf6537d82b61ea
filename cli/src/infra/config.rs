//! Infrastructure implementations of the `ConfigStore` and `PresetStore` ports.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::{ConfigStore, PresetStore};
use crate::domain::{PodctlConfig, Presets};
use crate::infra::paths::{CONFIG_FILE, PRESETS_FILE, podctl_home, write_atomic};

/// YAML config file, `config.yaml` under the podctl home by default.
pub struct YamlConfigStore {
    path: Option<PathBuf>,
}

impl YamlConfigStore {
    /// Store resolving its path from `PODCTL_HOME` on every call.
    #[must_use]
    pub fn new() -> Self {
        Self { path: None }
    }

    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }
}

impl Default for YamlConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<PodctlConfig> {
        let path = self.path()?;
        if !path.exists() {
            return Ok(PodctlConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(PodctlConfig::default());
        }
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }

    fn save(&self, config: &PodctlConfig) -> Result<()> {
        let path = self.path()?;
        let content = serde_yaml::to_string(config).context("cannot serialize config")?;
        write_atomic(&path, &content)
    }

    fn path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(p) => Ok(p.clone()),
            None => Ok(podctl_home()?.join(CONFIG_FILE)),
        }
    }
}

/// YAML map of preset name to partial resource spec.
pub struct YamlPresetStore {
    path: Option<PathBuf>,
}

impl YamlPresetStore {
    #[must_use]
    pub fn new() -> Self {
        Self { path: None }
    }

    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    fn path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(p) => Ok(p.clone()),
            None => Ok(podctl_home()?.join(PRESETS_FILE)),
        }
    }
}

impl Default for YamlPresetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PresetStore for YamlPresetStore {
    fn load(&self) -> Result<Presets> {
        let path = self.path()?;
        if !path.exists() {
            return Ok(Presets::new());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Presets::new());
        }
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }

    fn save(&self, presets: &Presets) -> Result<()> {
        let path = self.path()?;
        let content = serde_yaml::to_string(presets).context("cannot serialize presets")?;
        write_atomic(&path, &content)
    }
}
