//! `RemoteExecutor` and `ReachabilityCheck` over the system `ssh`/`scp`.
//!
//! Each call looks the pod up, derives its endpoint, and spawns a fresh
//! process. Host keys are not checked: pods are ephemeral and reuse addresses.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{
    CommandRunner, ExecOutcome, PodApi, ReachabilityCheck, RemoteExecutor, StreamMode,
};
use crate::domain::{PodError, SshEndpoint};

/// Exit code reported when `ssh` itself could not run.
pub const TRANSPORT_FAILURE_EXIT: i32 = 255;

/// Connect timeout for workload commands and transfers.
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Connect timeout for the reachability check.
pub const REACHABILITY_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Overall ceiling on one reachability attempt.
const REACHABILITY_TIMEOUT: Duration = Duration::from_secs(15);

/// Options shared by every `ssh` and `scp` invocation.
fn common_options(connect_timeout_secs: u64) -> Vec<String> {
    [
        "StrictHostKeyChecking=no".to_string(),
        "UserKnownHostsFile=/dev/null".to_string(),
        format!("ConnectTimeout={connect_timeout_secs}"),
        "LogLevel=ERROR".to_string(),
    ]
    .into_iter()
    .flat_map(|opt| ["-o".to_string(), opt])
    .collect()
}

/// `ssh` argument vector for `endpoint`, with `-t` when `tty` is set.
#[must_use]
pub fn ssh_args(endpoint: &SshEndpoint, connect_timeout_secs: u64, tty: bool) -> Vec<String> {
    let mut args = common_options(connect_timeout_secs);
    if tty {
        args.push("-t".to_string());
    }
    args.extend(["-p".to_string(), endpoint.port.to_string(), endpoint.target()]);
    args
}

/// `scp` option prefix for `endpoint`; sources and destination are appended.
#[must_use]
pub fn scp_args(endpoint: &SshEndpoint, connect_timeout_secs: u64, recursive: bool) -> Vec<String> {
    let mut args = common_options(connect_timeout_secs);
    args.extend(["-P".to_string(), endpoint.port.to_string()]);
    if recursive {
        args.push("-r".to_string());
    }
    args
}

fn as_strs(args: &[String]) -> Vec<&str> {
    args.iter().map(String::as_str).collect()
}

/// Production executor. `A` resolves endpoints, `R` spawns processes.
pub struct SshExecutor<A, R> {
    api: Arc<A>,
    runner: R,
    connect_timeout_secs: u64,
}

impl<A: PodApi, R: CommandRunner> SshExecutor<A, R> {
    pub fn new(api: Arc<A>, runner: R) -> Self {
        Self {
            api,
            runner,
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
        }
    }

    /// Resolve the SSH endpoint of `pod_id`.
    ///
    /// # Errors
    ///
    /// `PodError::NotFound` for an unknown pod, `PodError::NoSshEndpoint` when
    /// the pod exposes no port 22.
    pub async fn endpoint(&self, pod_id: &str) -> Result<SshEndpoint> {
        let pod = self
            .api
            .get_pod(pod_id)
            .await
            .with_context(|| format!("looking up pod {pod_id}"))?
            .ok_or_else(|| PodError::NotFound(pod_id.to_string()))?;
        pod.ssh_endpoint()
            .ok_or_else(|| PodError::NoSshEndpoint(pod_id.to_string()).into())
    }

    async fn copy(
        &self,
        pod_id: &str,
        endpoint: &SshEndpoint,
        recursive: bool,
        from: String,
        to: String,
    ) -> Result<()> {
        let mut args = scp_args(endpoint, self.connect_timeout_secs, recursive);
        args.push(from.clone());
        args.push(to.clone());
        tracing::debug!(pod_id, %from, %to, recursive, "scp");
        let output = self.runner.run("scp", &as_strs(&args)).await?;
        if output.status.success() {
            return Ok(());
        }
        Err(PodError::Transfer {
            pod_id: pod_id.to_string(),
            from,
            to,
            code: output.status.code().unwrap_or(TRANSPORT_FAILURE_EXIT),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into())
    }
}

impl<A: PodApi, R: CommandRunner> RemoteExecutor for SshExecutor<A, R> {
    async fn execute(&self, pod_id: &str, command: &str, mode: StreamMode) -> Result<ExecOutcome> {
        let endpoint = self.endpoint(pod_id).await?;
        let mut args = ssh_args(&endpoint, self.connect_timeout_secs, false);
        args.push(command.to_string());
        tracing::debug!(pod_id, command, ?mode, "ssh exec");

        match mode {
            StreamMode::Captured => match self.runner.run("ssh", &as_strs(&args)).await {
                Ok(output) => Ok(ExecOutcome {
                    exit_code: output.status.code().unwrap_or(TRANSPORT_FAILURE_EXIT),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                }),
                Err(e) => Ok(ExecOutcome {
                    exit_code: TRANSPORT_FAILURE_EXIT,
                    stdout: String::new(),
                    stderr: format!("{e:#}"),
                }),
            },
            StreamMode::Inherited => match self.runner.run_status("ssh", &as_strs(&args)).await {
                Ok(status) => Ok(ExecOutcome {
                    exit_code: status.code().unwrap_or(TRANSPORT_FAILURE_EXIT),
                    ..ExecOutcome::default()
                }),
                Err(e) => Ok(ExecOutcome {
                    exit_code: TRANSPORT_FAILURE_EXIT,
                    stdout: String::new(),
                    stderr: format!("{e:#}"),
                }),
            },
        }
    }

    async fn transfer_to(&self, pod_id: &str, local: &Path, remote: &str) -> Result<()> {
        let endpoint = self.endpoint(pod_id).await?;
        let recursive = local.is_dir();
        let to = format!("{}:{remote}", endpoint.target());
        self.copy(pod_id, &endpoint, recursive, local.display().to_string(), to)
            .await
    }

    async fn transfer_from(
        &self,
        pod_id: &str,
        remote: &str,
        local: &Path,
        recursive: bool,
    ) -> Result<()> {
        let endpoint = self.endpoint(pod_id).await?;
        let from = format!("{}:{remote}", endpoint.target());
        self.copy(pod_id, &endpoint, recursive, from, local.display().to_string())
            .await
    }

    async fn interactive_session(&self, pod_id: &str) -> Result<i32> {
        let endpoint = self.endpoint(pod_id).await?;
        let args = ssh_args(&endpoint, self.connect_timeout_secs, true);
        let status = self
            .runner
            .run_status("ssh", &as_strs(&args))
            .await
            .context("starting interactive ssh")?;
        Ok(status.code().unwrap_or(TRANSPORT_FAILURE_EXIT))
    }
}

impl<A: PodApi, R: CommandRunner> ReachabilityCheck for SshExecutor<A, R> {
    async fn is_reachable(&self, pod_id: &str) -> bool {
        let Ok(endpoint) = self.endpoint(pod_id).await else {
            return false;
        };
        let mut args = ssh_args(&endpoint, REACHABILITY_CONNECT_TIMEOUT_SECS, false);
        args.push("echo ok".to_string());
        match self
            .runner
            .run_with_timeout("ssh", &as_strs(&args), REACHABILITY_TIMEOUT)
            .await
        {
            Ok(output) => output.status.success(),
            Err(e) => {
                tracing::debug!(pod_id, error = %e, "ssh reachability check failed");
                false
            }
        }
    }
}
