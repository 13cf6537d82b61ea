//! Output formatting module

pub mod human;
pub mod json;
pub mod progress;
pub mod reporter;
pub mod styles;

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Result;
use console::Term;
use owo_colors::OwoColorize as _;
pub use human::HumanRenderer;
pub use reporter::TerminalReporter;
pub use styles::Styles;

use crate::domain::{GpuType, Pod, PodctlConfig, Presets, ResourceOverrides, UserInfo, WorkloadRun};

/// Output context carrying styling and terminal state.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
    /// Whether stdout is a TTY.
    pub is_tty: bool,
    /// Whether to suppress non-error output.
    pub quiet: bool,
}

impl OutputContext {
    /// Create output context based on CLI flags and environment.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let use_colors = !no_color && is_tty && std::env::var("NO_COLOR").is_err();

        let mut styles = Styles::default();
        if use_colors {
            styles.colorize();
        }

        Self {
            styles,
            is_tty,
            quiet,
        }
    }

    /// Check if progress indicators should be shown.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.is_tty && !self.quiet
    }

    /// Print a success message prefixed with `✓`. Suppressed when `quiet`.
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "✓".style(self.styles.success));
        }
    }

    /// Print a warning message prefixed with `⚠`. Suppressed when `quiet`.
    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "⚠".style(self.styles.warning));
        }
    }

    /// Print an error message prefixed with `✗` to stderr. Never suppressed.
    pub fn error(&self, msg: &str) {
        eprintln!("  {} {msg}", "✗".style(self.styles.error));
    }

    /// Print an info message prefixed with `ℹ`. Suppressed when `quiet`.
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "ℹ".style(self.styles.info));
        }
    }

    /// Print a key-value pair with the key dimmed. Suppressed when `quiet`.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {}  {value}", key.style(self.styles.dim));
        }
    }
}

/// Human or JSON rendering, chosen once per invocation.
pub enum Renderer<'a> {
    Human(HumanRenderer<'a>),
    Json,
}

impl Renderer<'_> {
    /// # Errors
    ///
    /// JSON serialization failures only.
    pub fn version(&self, version: &str) -> Result<()> {
        match self {
            Self::Human(h) => h.render_version(version),
            Self::Json => json::print(&serde_json::json!({ "version": version }))?,
        }
        Ok(())
    }

    /// # Errors
    ///
    /// JSON serialization failures only.
    pub fn pods(&self, pods: &[Pod]) -> Result<()> {
        match self {
            Self::Human(h) => h.render_pods(pods),
            Self::Json => json::print(pods)?,
        }
        Ok(())
    }

    /// # Errors
    ///
    /// JSON serialization failures only.
    pub fn pod(&self, verb: &str, pod: &Pod) -> Result<()> {
        match self {
            Self::Human(h) => h.render_pod(verb, pod),
            Self::Json => json::print(pod)?,
        }
        Ok(())
    }

    /// # Errors
    ///
    /// JSON serialization failures only.
    pub fn gpus(&self, gpus: &[GpuType]) -> Result<()> {
        match self {
            Self::Human(h) => h.render_gpus(gpus),
            Self::Json => json::print(gpus)?,
        }
        Ok(())
    }

    /// # Errors
    ///
    /// JSON serialization failures only.
    pub fn user(&self, user: &UserInfo) -> Result<()> {
        match self {
            Self::Human(h) => h.render_user(user),
            Self::Json => json::print(user)?,
        }
        Ok(())
    }

    /// # Errors
    ///
    /// JSON serialization failures only.
    pub fn config(&self, config: &PodctlConfig, path: &Path) -> Result<()> {
        match self {
            Self::Human(h) => h.render_config(config, path),
            Self::Json => json::print(&json::config_view(config, path))?,
        }
        Ok(())
    }

    /// # Errors
    ///
    /// JSON serialization failures only.
    pub fn presets(&self, presets: &Presets) -> Result<()> {
        match self {
            Self::Human(h) => h.render_presets(presets),
            Self::Json => json::print(presets)?,
        }
        Ok(())
    }

    /// # Errors
    ///
    /// JSON serialization failures only.
    pub fn preset(&self, name: &str, overrides: &ResourceOverrides) -> Result<()> {
        match self {
            Self::Human(h) => h.render_preset(name, overrides),
            Self::Json => json::print(&serde_json::json!({ "name": name, "spec": overrides }))?,
        }
        Ok(())
    }

    /// # Errors
    ///
    /// JSON serialization failures only.
    pub fn managed(&self, ids: &BTreeSet<String>) -> Result<()> {
        match self {
            Self::Human(h) => h.render_managed(ids),
            Self::Json => json::print(ids)?,
        }
        Ok(())
    }

    /// # Errors
    ///
    /// JSON serialization failures only.
    pub fn workload(&self, run: &WorkloadRun) -> Result<()> {
        match self {
            Self::Human(h) => h.render_workload(run),
            Self::Json => json::print(run)?,
        }
        Ok(())
    }
}
