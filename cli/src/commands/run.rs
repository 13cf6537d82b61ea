//! Workload commands: `test`, `exec`, and `shell` on a fresh pod.
//!
//! Each one resolves the resource spec, then hands an action to the
//! orchestrator. The action runs only once the pod answers over SSH.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use crate::app::{AppContext, exit_code};
use crate::application::ports::{
    ConfigStore, ExecOutcome, ProgressReporter, RemoteExecutor, StreamMode,
};
use crate::application::services::config_service;
use crate::application::services::orchestrator::{
    Workload, WorkloadOptions, run_ephemeral_workload,
};
use crate::commands::SpecArgs;
use crate::domain::ResolvedSpec;
use crate::domain::workload::{DEFAULT_TEST_COMMAND, REMOTE_WORKDIR, shell_quote};
use crate::infra::graphql::GraphqlPodApi;
use crate::output::TerminalReporter;

/// Arguments for `podctl test`.
#[derive(Args)]
pub struct TestArgs {
    /// Local file or directory to upload and test
    pub path: PathBuf,

    /// Test command run in the uploaded directory
    #[arg(long, default_value = DEFAULT_TEST_COMMAND)]
    pub command: String,

    #[command(flatten)]
    pub spec: SpecArgs,
}

/// Arguments for `podctl exec`.
#[derive(Args)]
pub struct ExecArgs {
    #[command(flatten)]
    pub spec: SpecArgs,

    /// Command to run on the pod. A single argument is passed to the remote
    /// shell as-is; several are quoted one by one.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Arguments for `podctl shell`.
#[derive(Args)]
pub struct ShellArgs {
    #[command(flatten)]
    pub spec: SpecArgs,
}

fn resolve(app: &AppContext, spec: &SpecArgs) -> Result<ResolvedSpec> {
    let config = app.config_store.load()?;
    config_service::resolve_workload_spec(
        &config,
        &app.preset_store,
        spec.preset.as_deref(),
        &spec.resources.overrides(),
    )
}

/// Where an upload lands and the shell line that runs `command` against it.
fn remote_test_line(local: &Path, command: &str) -> Result<(String, String)> {
    let canonical = std::fs::canonicalize(local)
        .with_context(|| format!("cannot access {}", local.display()))?;
    let name = canonical
        .file_name()
        .map_or_else(|| "project".to_string(), |n| n.to_string_lossy().into_owned());
    let remote = format!("{REMOTE_WORKDIR}/{name}");
    let line = if canonical.is_dir() {
        format!("cd {} && {command}", shell_quote(&remote))
    } else {
        format!("cd {REMOTE_WORKDIR} && {command} {}", shell_quote(&name))
    };
    Ok((remote, line))
}

/// The remote shell line for `exec`.
///
/// One argument is a shell line of its own (`exec "make && make test"`).
/// Several keep their boundaries, so `exec -- python -c "import x; x.f()"`
/// reaches the pod as three words.
fn remote_exec_line(args: &[String]) -> String {
    match args {
        [line] => line.clone(),
        words => words
            .iter()
            .map(|w| shell_quote(w))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// Put captured output on the run when the action captured it.
fn finish(app: &AppContext, workload: Workload) -> Result<ExitCode> {
    let Workload { run, output, .. } = workload;
    let run = if app.stream_mode() == StreamMode::Captured {
        run.with_output(output.stdout, output.stderr)
    } else {
        run
    };
    app.renderer().workload(&run)?;
    Ok(exit_code(run.exit_code))
}

/// Upload `path` and run the test command on a fresh pod.
///
/// # Errors
///
/// Returns an error if `path` does not exist, the pod never becomes ready, or
/// the upload fails.
pub async fn test(app: &AppContext, api: &Arc<GraphqlPodApi>, args: TestArgs) -> Result<ExitCode> {
    let (remote, line) = remote_test_line(&args.path, &args.command)?;
    let spec = resolve(app, &args.spec)?;
    let executor = app.executor(api);
    let reporter = TerminalReporter::new(&app.output);
    let local = args.path.as_path();
    let mode = app.stream_mode();
    let exec = &executor;
    let report = &reporter;

    let workload = run_ephemeral_workload(
        api,
        &app.registry,
        &executor,
        WorkloadOptions {
            reporter: &reporter,
            spec: &spec.resources,
            timeout_minutes: spec.timeout_minutes,
            readiness: app.readiness,
        },
        move |pod_id| async move {
            report.step(&format!("uploading {}...", local.display()));
            exec.transfer_to(&pod_id, local, &remote).await?;
            report.success(&format!("uploaded to {remote}"));
            tracing::info!(pod_id = %pod_id, command = %line, "running tests");
            exec.execute(&pod_id, &line, mode).await
        },
    )
    .await?;

    finish(app, workload)
}

/// Run one command on a fresh pod.
///
/// # Errors
///
/// Returns an error if the pod never becomes ready.
pub async fn exec(app: &AppContext, api: &Arc<GraphqlPodApi>, args: ExecArgs) -> Result<ExitCode> {
    let spec = resolve(app, &args.spec)?;
    let command = remote_exec_line(&args.command);
    let executor = app.executor(api);
    let reporter = TerminalReporter::new(&app.output);
    let mode = app.stream_mode();
    let exec = &executor;
    let command = command.as_str();

    let workload = run_ephemeral_workload(
        api,
        &app.registry,
        &executor,
        WorkloadOptions {
            reporter: &reporter,
            spec: &spec.resources,
            timeout_minutes: spec.timeout_minutes,
            readiness: app.readiness,
        },
        move |pod_id| async move { exec.execute(&pod_id, command, mode).await },
    )
    .await?;

    finish(app, workload)
}

/// Open an interactive shell on a fresh pod.
///
/// # Errors
///
/// Returns an error in JSON mode, or if the pod never becomes ready.
pub async fn shell(app: &AppContext, api: &Arc<GraphqlPodApi>, args: ShellArgs) -> Result<ExitCode> {
    anyhow::ensure!(
        !app.is_json(),
        "shell is interactive and cannot be used with --json"
    );
    let spec = resolve(app, &args.spec)?;
    let executor = app.executor(api);
    let reporter = TerminalReporter::new(&app.output);
    let exec = &executor;

    let workload = run_ephemeral_workload(
        api,
        &app.registry,
        &executor,
        WorkloadOptions {
            reporter: &reporter,
            spec: &spec.resources,
            timeout_minutes: spec.timeout_minutes,
            readiness: app.readiness,
        },
        move |pod_id| async move {
            exec.interactive_session(&pod_id)
                .await
                .map(ExecOutcome::exited)
        },
    )
    .await?;

    finish(app, workload)
}
