//! Workload commands end to end: a mocked provider plus stand-in `ssh` and
//! `scp` scripts on `PATH`.

#![cfg(unix)]
#![allow(clippy::expect_used)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::MockServer;

use crate::cli_tests::podctl;
use crate::provider_tests::{KEY, answer, home_for, pod_json, registry};

/// Exit code of every non-trivial remote command.
const REMOTE_EXIT: i32 = 7;

/// Directory holding fake `ssh` and `scp` executables.
///
/// `ssh` answers the reachability check (`echo ok`) with success. Any other
/// command is appended to `ssh.log`, prints to both streams, and exits with
/// `REMOTE_EXIT`. `scp` always succeeds.
struct FakeSsh {
    dir: TempDir,
}

impl FakeSsh {
    fn install() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = dir.path().join("ssh.log");
        let ssh = format!(
            "#!/bin/sh\n\
             for last; do :; done\n\
             if [ \"$last\" = \"echo ok\" ]; then exit 0; fi\n\
             printf '%s\\n' \"$last\" >> '{}'\n\
             echo hello-from-pod\n\
             echo remote-warning >&2\n\
             exit {REMOTE_EXIT}\n",
            log.display()
        );
        write_executable(&dir.path().join("ssh"), &ssh);
        write_executable(&dir.path().join("scp"), "#!/bin/sh\nexit 0\n");
        Self { dir }
    }

    fn path_env(&self) -> String {
        let system = std::env::var("PATH").unwrap_or_default();
        format!("{}:{system}", self.dir.path().display())
    }

    /// Remote commands `ssh` was asked to run, in order.
    fn commands(&self) -> Vec<String> {
        std::fs::read_to_string(self.dir.path().join("ssh.log"))
            .unwrap_or_default()
            .lines()
            .map(String::from)
            .collect()
    }
}

fn write_executable(path: &Path, body: &str) {
    std::fs::write(path, body).expect("write script");
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).expect("chmod");
}

/// A provider that creates `p1` RUNNING, reports it on lookup, and accepts
/// terminates.
async fn provider() -> MockServer {
    let server = MockServer::start().await;
    answer(
        &server,
        "podFindAndDeployOnDemand",
        json!({ "data": { "podFindAndDeployOnDemand": pod_json("p1", "RUNNING") } }),
    )
    .await;
    answer(
        &server,
        "PodFilter",
        json!({ "data": { "pod": pod_json("p1", "RUNNING") } }),
    )
    .await;
    answer(
        &server,
        "podTerminate",
        json!({ "data": { "podTerminate": null } }),
    )
    .await;
    server
}

async fn run(home: &TempDir, ssh: &FakeSsh, args: &[&str]) -> std::process::Output {
    let mut cmd = podctl(home);
    cmd.env("PODCTL_API_KEY", KEY)
        .env("PATH", ssh.path_env())
        .args(args);
    tokio::task::spawn_blocking(move || cmd.output().expect("run"))
        .await
        .expect("join")
}

async fn requests_containing(server: &MockServer, needle: &str) -> usize {
    server
        .received_requests()
        .await
        .expect("recording")
        .iter()
        .filter(|r| String::from_utf8_lossy(&r.body).contains(needle))
        .count()
}

#[tokio::test(flavor = "multi_thread")]
async fn exec_json_is_one_document_with_captured_output() {
    let server = provider().await;
    let home = home_for(&server);
    let ssh = FakeSsh::install();

    let out = run(&home, &ssh, &["exec", "--json", "nvidia-smi"]).await;

    assert_eq!(
        out.status.code(),
        Some(REMOTE_EXIT),
        "{}",
        String::from_utf8_lossy(&out.stderr)
    );
    let v: Value = serde_json::from_slice(&out.stdout).expect("stdout is one JSON document");
    assert_eq!(v["pod_id"], "p1");
    assert_eq!(v["exit_code"], REMOTE_EXIT);
    assert_eq!(v["stdout"], "hello-from-pod\n");
    assert_eq!(v["stderr"], "remote-warning\n");
    assert!(v["auto_termination_at"].is_string());

    assert_eq!(requests_containing(&server, "podFindAndDeployOnDemand").await, 1);
    assert_eq!(requests_containing(&server, "podTerminate").await, 1);
    assert!(registry(&home).is_empty());
    assert_eq!(ssh.commands(), vec!["nvidia-smi"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn exec_streams_output_and_passes_exit_code_through() {
    let server = provider().await;
    let home = home_for(&server);
    let ssh = FakeSsh::install();

    let out = run(
        &home,
        &ssh,
        &["exec", "--", "python", "-c", "import x; x.f()"],
    )
    .await;

    assert_eq!(out.status.code(), Some(REMOTE_EXIT));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("hello-from-pod"), "{stdout}");
    assert!(stdout.contains("exited with code 7"), "{stdout}");
    assert_eq!(ssh.commands(), vec!["python -c 'import x; x.f()'"]);
    assert_eq!(requests_containing(&server, "podTerminate").await, 1);
    assert!(registry(&home).is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_uploads_then_runs_the_test_command() {
    let server = provider().await;
    let home = home_for(&server);
    let ssh = FakeSsh::install();
    let project = tempfile::tempdir().expect("tempdir");
    let suite: PathBuf = project.path().join("test_gpu.py");
    std::fs::write(&suite, "def test_ok():\n    pass\n").expect("write suite");

    let path = suite.display().to_string();
    let out = run(&home, &ssh, &["test", &path, "--json"]).await;

    assert_eq!(out.status.code(), Some(REMOTE_EXIT));
    let v: Value = serde_json::from_slice(&out.stdout).expect("stdout is one JSON document");
    assert_eq!(v["exit_code"], REMOTE_EXIT);
    assert_eq!(
        ssh.commands(),
        vec!["cd /workspace && python -m pytest -v test_gpu.py"]
    );
    assert_eq!(requests_containing(&server, "podTerminate").await, 1);
    assert!(registry(&home).is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn shell_rejects_json_before_creating_a_pod() {
    let server = provider().await;
    let home = home_for(&server);
    let ssh = FakeSsh::install();

    let out = run(&home, &ssh, &["shell", "--json"]).await;

    assert!(!out.status.success());
    let v: Value = serde_json::from_slice(&out.stdout).expect("stdout is one JSON document");
    assert_eq!(v["error"], true);
    assert!(v["message"].as_str().is_some_and(|m| m.contains("--json")));
    assert_eq!(requests_containing(&server, "podFindAndDeployOnDemand").await, 0);
}
