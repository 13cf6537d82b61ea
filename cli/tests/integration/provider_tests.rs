//! Provider-facing commands against a mocked GraphQL endpoint.

#![allow(clippy::expect_used)]

use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::cli_tests::podctl;

pub const KEY: &str = "rpa_testkey";

pub fn pod_json(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "name": format!("podctl-{id}"),
        "desiredStatus": status,
        "imageName": "img",
        "gpuCount": 1,
        "costPerHr": 0.44,
        "runtime": {
            "uptimeInSeconds": 90,
            "ports": [
                { "ip": "10.0.0.1", "isIpPublic": true, "privatePort": 22, "publicPort": 10022, "type": "tcp" }
            ]
        }
    })
}

pub async fn answer(server: &MockServer, needle: &str, body: Value) {
    Mock::given(method("POST"))
        .and(query_param("api_key", KEY))
        .and(body_string_contains(needle))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// A home whose config points at `server`.
pub fn home_for(server: &MockServer) -> TempDir {
    let home = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        home.path().join("config.yaml"),
        format!("api_url: {}\n", server.uri()),
    )
    .expect("config");
    home
}

/// Run the binary off the async runtime and return its output.
async fn run(home: &TempDir, args: &[&str]) -> std::process::Output {
    let mut cmd = podctl(home);
    cmd.env("PODCTL_API_KEY", KEY).args(args);
    tokio::task::spawn_blocking(move || cmd.output().expect("run"))
        .await
        .expect("join")
}

pub fn registry(home: &TempDir) -> Vec<String> {
    let path = home.path().join("managed_pods.json");
    if !path.exists() {
        return Vec::new();
    }
    serde_json::from_str(&std::fs::read_to_string(path).expect("read")).expect("parse")
}

#[tokio::test(flavor = "multi_thread")]
async fn pods_json_lists_account_pods() {
    let server = MockServer::start().await;
    answer(
        &server,
        "pods",
        json!({ "data": { "myself": { "pods": [pod_json("b", "EXITED"), pod_json("a", "RUNNING")] } } }),
    )
    .await;
    let home = home_for(&server);

    let out = run(&home, &["pods", "--json"]).await;
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let pods: Value = serde_json::from_slice(&out.stdout).expect("json");
    let ids: Vec<&str> = pods
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|p| p["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn whoami_renders_account() {
    let server = MockServer::start().await;
    answer(
        &server,
        "clientBalance",
        json!({ "data": { "myself": { "id": "u1", "email": "dev@example.com", "clientBalance": 12.5, "currentSpendPerHr": 0.44 } } }),
    )
    .await;
    let home = home_for(&server);

    let out = run(&home, &["whoami"]).await;
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("dev@example.com"), "{stdout}");
    assert!(stdout.contains("$12.50"), "{stdout}");
}

#[tokio::test(flavor = "multi_thread")]
async fn kill_all_empties_the_registry() {
    let server = MockServer::start().await;
    answer(
        &server,
        "podTerminate",
        json!({ "data": { "podTerminate": null } }),
    )
    .await;
    let home = home_for(&server);
    std::fs::write(home.path().join("managed_pods.json"), r#"["a","b"]"#).expect("seed");

    let out = run(&home, &["kill", "--all", "--json"]).await;
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(registry(&home).is_empty());
    let terminates = server
        .received_requests()
        .await
        .expect("recording")
        .iter()
        .filter(|r| String::from_utf8_lossy(&r.body).contains("podTerminate"))
        .count();
    assert_eq!(terminates, 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn kill_unknown_pod_reports_not_found() {
    let server = MockServer::start().await;
    answer(
        &server,
        "PodFilter",
        json!({ "data": null, "errors": [{ "message": "pod not found" }] }),
    )
    .await;
    let home = home_for(&server);

    let out = run(&home, &["kill", "ghost", "--json"]).await;
    assert!(!out.status.success());
    let v: Value = serde_json::from_slice(&out.stdout).expect("json");
    assert_eq!(v["code"], "pod_not_found");
}

#[tokio::test(flavor = "multi_thread")]
async fn exit_guard_terminates_leftover_managed_pods() {
    let server = MockServer::start().await;
    answer(
        &server,
        "clientBalance",
        json!({ "data": { "myself": { "id": "u1", "email": null, "clientBalance": 1.0, "currentSpendPerHr": 0.0 } } }),
    )
    .await;
    answer(
        &server,
        "podTerminate",
        json!({ "data": { "podTerminate": null } }),
    )
    .await;
    let home = home_for(&server);
    std::fs::write(home.path().join("managed_pods.json"), r#"["leftover"]"#).expect("seed");

    let out = run(&home, &["whoami", "--json"]).await;
    assert!(out.status.success());
    assert!(registry(&home).is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn provider_outage_is_a_command_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;
    let home = home_for(&server);

    let out = run(&home, &["gpus", "--json"]).await;
    assert!(!out.status.success());
    let v: Value = serde_json::from_slice(&out.stdout).expect("json");
    assert_eq!(v["code"], "command_failed");
    assert!(v["message"].as_str().is_some_and(|m| m.contains("503")));
}

#[tokio::test(flavor = "multi_thread")]
async fn graphql_error_message_reaches_the_user() {
    let server = MockServer::start().await;
    answer(
        &server,
        "pods",
        json!({ "data": { "myself": null }, "errors": [{ "message": "Unauthorized request" }] }),
    )
    .await;
    let home = home_for(&server);

    let out = run(&home, &["pods"]).await;
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Unauthorized request"), "{stderr}");
    assert_eq!(stderr.matches("listing pods").count(), 1, "{stderr}");
}
