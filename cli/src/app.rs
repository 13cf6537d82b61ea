//! Application context: unified state passed to every command handler.
//!
//! `AppContext` owns the output settings and the local stores. The provider
//! client is built on demand because only some commands need it and building
//! it requires an API key.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;

use crate::application::services::config_service::{API_KEY_ENV, resolve_api_key};
use crate::application::services::readiness::ReadinessConfig;
use crate::application::ports::{ConfigStore, StreamMode};
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::{YamlConfigStore, YamlPresetStore};
use crate::infra::graphql::GraphqlPodApi;
use crate::infra::registry_store::JsonRegistryStore;
use crate::infra::ssh::SshExecutor;
use crate::output::{HumanRenderer, OutputContext, Renderer};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Production executor type.
pub type Executor = SshExecutor<GraphqlPodApi, TokioCommandRunner>;

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    pub config_store: YamlConfigStore,
    pub preset_store: YamlPresetStore,
    /// Managed-pod registry shared with auto-termination timers.
    pub registry: Arc<JsonRegistryStore>,
    pub readiness: ReadinessConfig,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// JSON mode silences progress output so stdout carries one document.
    ///
    /// # Errors
    ///
    /// Returns an error if the podctl home directory cannot be determined.
    pub fn new(flags: &AppFlags) -> Result<Self> {
        let mode = if flags.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        Ok(Self {
            output: OutputContext::new(flags.no_color, flags.quiet || flags.json),
            mode,
            config_store: YamlConfigStore::new(),
            preset_store: YamlPresetStore::new(),
            registry: Arc::new(JsonRegistryStore::new()?),
            readiness: ReadinessConfig::default(),
        })
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Remote output is captured in JSON mode so stdout stays one document.
    #[must_use]
    pub fn stream_mode(&self) -> StreamMode {
        if self.is_json() {
            StreamMode::Captured
        } else {
            StreamMode::Inherited
        }
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json,
        }
    }

    /// Build the provider client from config and `PODCTL_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingApiKey` when no key is configured.
    pub fn api(&self) -> Result<Arc<GraphqlPodApi>> {
        let config = self.config_store.load()?;
        let key = resolve_api_key(&config, std::env::var(API_KEY_ENV).ok())?;
        Ok(Arc::new(GraphqlPodApi::new(config.api_url(), &key)?))
    }

    /// SSH executor resolving endpoints through `api`.
    #[must_use]
    pub fn executor(&self, api: &Arc<GraphqlPodApi>) -> Executor {
        SshExecutor::new(api.clone(), TokioCommandRunner::default())
    }

    /// Ask the user for confirmation. `--yes` callers skip this.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails (e.g. no TTY available).
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::debug!("received Ctrl-C"),
        () = terminate => tracing::debug!("received SIGTERM"),
    }
}

/// Map a remote exit code onto a process exit status. Out-of-range codes become 1.
#[must_use]
pub fn exit_status(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}

/// `ExitCode` for a remote exit code.
#[must_use]
pub fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(exit_status(code))
}

/// Exit code used when a shutdown signal interrupted the command.
pub const INTERRUPTED_EXIT: u8 = 130;
