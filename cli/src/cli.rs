//! CLI argument parsing with clap derive

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, INTERRUPTED_EXIT, shutdown_signal};
use crate::application::services::exit_guard::{ExitGuard, Guarded};
use crate::commands;
use crate::infra::graphql::GraphqlPodApi;
use crate::output::TerminalReporter;

/// Ephemeral GPU pods for tests, commands, and shells
#[derive(Parser)]
#[command(
    name = "podctl",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Upload a path to a fresh pod and run its tests
    Test(commands::run::TestArgs),

    /// Run a command on a fresh pod
    Exec(commands::run::ExecArgs),

    /// Open a shell on a fresh pod
    Shell(commands::run::ShellArgs),

    /// List pods on the account
    Pods,

    /// Resume a stopped pod
    Start {
        /// Pod id
        pod_id: String,
    },

    /// Stop a running pod
    Stop {
        /// Pod id
        pod_id: String,
    },

    /// Terminate a pod, or all managed pods
    Kill(commands::kill::KillArgs),

    /// Copy files to or from a pod
    Transfer(commands::transfer::TransferArgs),

    /// List pods this tool is responsible for
    Managed,

    /// List available GPU types
    Gpus,

    /// Show the account behind the API key
    Whoami,

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Manage resource presets
    #[command(subcommand)]
    Preset(commands::preset::PresetCommand),

    /// Show version
    Version,
}

impl Command {
    /// Whether the command needs the provider API (and so the exit guard).
    #[must_use]
    pub fn uses_provider(&self) -> bool {
        !matches!(
            self,
            Self::Config(_) | Self::Preset(_) | Self::Version | Self::Managed
        )
    }
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            verbose: _,
            command,
        } = self;
        let app = AppContext::new(&AppFlags {
            no_color,
            quiet,
            json,
        })?;

        if !command.uses_provider() {
            return local(&app, command);
        }

        let api = app.api()?;
        let reporter = TerminalReporter::new(&app.output);
        let guard = ExitGuard::acquire(api.clone(), app.registry.clone());
        match guard
            .run(dispatch(&app, &api, command), shutdown_signal(), &reporter)
            .await
        {
            Guarded::Finished(result) => result,
            Guarded::Interrupted => Ok(ExitCode::from(INTERRUPTED_EXIT)),
        }
    }
}

fn local(app: &AppContext, command: Command) -> Result<ExitCode> {
    match command {
        Command::Managed => commands::managed::run(app),
        Command::Config(cmd) => commands::config::run(app, cmd),
        Command::Preset(cmd) => commands::preset::run(app, cmd),
        _ => commands::version::run(app),
    }
}

async fn dispatch(app: &AppContext, api: &Arc<GraphqlPodApi>, command: Command) -> Result<ExitCode> {
    match command {
        Command::Test(args) => commands::run::test(app, api, args).await,
        Command::Exec(args) => commands::run::exec(app, api, args).await,
        Command::Shell(args) => commands::run::shell(app, api, args).await,
        Command::Pods => commands::pods::run(app, api.as_ref()).await,
        Command::Start { pod_id } => commands::start::run(app, api.as_ref(), &pod_id).await,
        Command::Stop { pod_id } => commands::stop::run(app, api.as_ref(), &pod_id).await,
        Command::Kill(args) => {
            commands::kill::run(app, api.as_ref(), app.registry.as_ref(), args).await
        }
        Command::Transfer(args) => {
            let executor = app.executor(api);
            commands::transfer::run(app, &executor, args).await
        }
        Command::Gpus => commands::gpus::run(app, api.as_ref()).await,
        Command::Whoami => commands::whoami::run(app, api.as_ref()).await,
        local_command => local(app, local_command),
    }
}
