//! Infrastructure implementation of the `ManagedPodStore` port.
//!
//! The set is a JSON array of ids in a single file. Every mutation reads the
//! whole file and replaces it atomically (temp file + rename). There is no
//! cross-process lock: two concurrent invocations can lose an update.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::ManagedPodStore;
use crate::infra::paths::{REGISTRY_FILE, podctl_home, write_atomic};

/// Managed-pod registry backed by `managed_pods.json`.
pub struct JsonRegistryStore {
    path: PathBuf,
}

impl JsonRegistryStore {
    /// Registry under the podctl home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(podctl_home()?.join(REGISTRY_FILE)))
    }

    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeSet<String>> {
        if !self.path.exists() {
            return Ok(BTreeSet::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading registry {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(BTreeSet::new());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("parsing registry {}", self.path.display()))
    }

    fn write(&self, ids: &BTreeSet<String>) -> Result<()> {
        let content = serde_json::to_string_pretty(ids).context("serializing registry")?;
        write_atomic(&self.path, &content)
    }

    fn update(&self, f: impl FnOnce(&mut BTreeSet<String>) -> bool) -> Result<()> {
        let mut ids = self.read()?;
        if f(&mut ids) {
            self.write(&ids)?;
        }
        Ok(())
    }
}

impl ManagedPodStore for JsonRegistryStore {
    fn register(&self, pod_id: &str) -> Result<()> {
        self.update(|ids| ids.insert(pod_id.to_string()))?;
        tracing::debug!(pod_id, "registered managed pod");
        Ok(())
    }

    fn unregister(&self, pod_id: &str) -> Result<()> {
        self.update(|ids| ids.remove(pod_id))?;
        tracing::debug!(pod_id, "unregistered managed pod");
        Ok(())
    }

    fn list(&self) -> Result<BTreeSet<String>> {
        self.read()
    }
}
