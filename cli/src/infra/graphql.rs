//! `PodApi` over the provider's GraphQL endpoint.
//!
//! Every call is a single POST of `{query, variables}` authenticated with the
//! `api_key` query parameter. GraphQL-level errors arrive with HTTP 200 and an
//! `errors` array; "not found" messages are normalized so that lookups return
//! `None` and terminates of vanished pods succeed.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::application::ports::PodApi;
use crate::domain::{GpuType, Pod, ResourceSpec, UserInfo};

const POD_FIELDS: &str = "id name desiredStatus imageName gpuCount costPerHr \
    runtime { uptimeInSeconds ports { ip isIpPublic privatePort publicPort type } }";

/// Production `PodApi` backed by `reqwest`.
pub struct GraphqlPodApi {
    client: Client,
    url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

/// Failure reported inside a GraphQL response body.
#[derive(Debug, thiserror::Error)]
#[error("provider API error: {0}")]
struct ApiError(String);

impl ApiError {
    fn is_not_found(&self) -> bool {
        let msg = self.0.to_ascii_lowercase();
        msg.contains("not found") || msg.contains("does not exist")
    }
}

fn is_not_found(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ApiError>()
        .is_some_and(ApiError::is_not_found)
}

impl GraphqlPodApi {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: &str, api_key: &str) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .user_agent(concat!("podctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            url: url.to_string(),
            api_key: api_key.trim().to_string(),
        })
    }

    async fn request<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        tracing::debug!(url = %self.url, "graphql request");
        let resp = self
            .client
            .post(&self.url)
            .query(&[("api_key", self.api_key.as_str())])
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .context("provider API unreachable")?;

        let status = resp.status();
        let body = resp.text().await.context("reading provider response")?;
        if !status.is_success() {
            // 4xx bodies usually still carry a GraphQL error message.
            if let Ok(env) = serde_json::from_str::<Envelope>(&body)
                && let Some(first) = env.errors.first()
            {
                return Err(ApiError(first.message.clone()).into());
            }
            anyhow::bail!("provider API returned HTTP {status}: {}", body.trim());
        }

        // Errors come first: a failed field is usually `null` in `data`.
        let env: Envelope = serde_json::from_str(&body).context("parsing provider response")?;
        if !env.errors.is_empty() {
            let msg = env
                .errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ApiError(msg).into());
        }
        let data = env
            .data
            .ok_or_else(|| anyhow::anyhow!("provider response has no data"))?;
        serde_json::from_value(data).context("parsing provider response")
    }
}

fn create_input(spec: &ResourceSpec) -> Value {
    let mut input = json!({
        "cloudType": "ALL",
        "gpuCount": spec.gpu_count,
        "gpuTypeId": spec.gpu_type,
        "imageName": spec.image,
        "containerDiskInGb": spec.container_disk_gb,
        "volumeInGb": spec.volume_gb,
        "name": format!("podctl-{}", chrono::Utc::now().format("%Y%m%d-%H%M%S")),
        "ports": "22/tcp",
        "startSsh": true,
    });
    if let Some(team) = &spec.team_id {
        input["teamId"] = json!(team);
    }
    input
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateData {
    pod_find_and_deploy_on_demand: Option<Pod>,
}

#[derive(Deserialize)]
struct PodData {
    pod: Option<Pod>,
}

#[derive(Deserialize)]
struct MyselfPods {
    myself: PodList,
}

#[derive(Deserialize)]
struct PodList {
    #[serde(default)]
    pods: Vec<Pod>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StopData {
    pod_stop: Pod,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResumeData {
    pod_resume: Pod,
}

#[derive(Deserialize)]
struct MyselfData {
    myself: UserInfo,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GpuTypesData {
    gpu_types: Vec<GpuType>,
}

#[async_trait]
impl PodApi for GraphqlPodApi {
    async fn create_pod(&self, spec: &ResourceSpec) -> Result<Option<Pod>> {
        let q = format!(
            "mutation($input: PodFindAndDeployOnDemandInput!) {{ \
             podFindAndDeployOnDemand(input: $input) {{ {POD_FIELDS} }} }}"
        );
        let data: CreateData = self
            .request(&q, json!({ "input": create_input(spec) }))
            .await
            .context("creating pod")?;
        Ok(data.pod_find_and_deploy_on_demand)
    }

    async fn get_pod(&self, pod_id: &str) -> Result<Option<Pod>> {
        let q = format!("query($input: PodFilter!) {{ pod(input: $input) {{ {POD_FIELDS} }} }}");
        match self
            .request::<PodData>(&q, json!({ "input": { "podId": pod_id } }))
            .await
        {
            Ok(data) => Ok(data.pod),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(e.context(format!("fetching pod {pod_id}"))),
        }
    }

    async fn list_pods(&self) -> Result<Vec<Pod>> {
        let q = format!("query {{ myself {{ pods {{ {POD_FIELDS} }} }} }}");
        let data: MyselfPods = self.request(&q, json!({})).await.context("listing pods")?;
        Ok(data.myself.pods)
    }

    async fn terminate_pod(&self, pod_id: &str) -> Result<()> {
        let q = "mutation($input: PodTerminateInput!) { podTerminate(input: $input) }";
        match self
            .request::<Value>(q, json!({ "input": { "podId": pod_id } }))
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if is_not_found(&e) => {
                tracing::debug!(pod_id, "terminate: pod already gone");
                Ok(())
            }
            Err(e) => Err(e.context(format!("terminating pod {pod_id}"))),
        }
    }

    async fn stop_pod(&self, pod_id: &str) -> Result<Pod> {
        let q = format!(
            "mutation($input: PodStopInput!) {{ podStop(input: $input) {{ {POD_FIELDS} }} }}"
        );
        let data: StopData = self
            .request(&q, json!({ "input": { "podId": pod_id } }))
            .await
            .with_context(|| format!("stopping pod {pod_id}"))?;
        Ok(data.pod_stop)
    }

    async fn resume_pod(&self, pod_id: &str, gpu_count: u32) -> Result<Pod> {
        let q = format!(
            "mutation($input: PodResumeInput!) {{ podResume(input: $input) {{ {POD_FIELDS} }} }}"
        );
        let data: ResumeData = self
            .request(
                &q,
                json!({ "input": { "podId": pod_id, "gpuCount": gpu_count } }),
            )
            .await
            .with_context(|| format!("resuming pod {pod_id}"))?;
        Ok(data.pod_resume)
    }

    async fn user_info(&self) -> Result<UserInfo> {
        let q = "query { myself { id email clientBalance currentSpendPerHr } }";
        let data: MyselfData = self.request(q, json!({})).await.context("fetching account")?;
        Ok(data.myself)
    }

    async fn gpu_types(&self) -> Result<Vec<GpuType>> {
        let q = "query { gpuTypes { id displayName memoryInGb } }";
        let data: GpuTypesData = self
            .request(q, json!({}))
            .await
            .context("listing GPU types")?;
        Ok(data.gpu_types)
    }
}
