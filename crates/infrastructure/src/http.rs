use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use workcell_core::traits::{DeviceClient, RegistryClient, StateBroadcaster};
use workcell_core::{
    DispatchStatus, NodeInfo, NodeState, SchedulerError, SchedulerResult,
};

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// HTTP client for the workcell master registry.
pub struct HttpRegistryClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpRegistryClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client: build_client(timeout),
        }
    }
}

#[async_trait]
impl RegistryClient for HttpRegistryClient {
    async fn register(&self, kind: &str, name: &str) -> SchedulerResult<DispatchStatus> {
        let url = format!("{}/api/v1/nodes/register", self.base_url);
        let body = json!({ "type": kind, "name": name });

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SchedulerError::RegistryUnavailable(e.to_string()))?;

        if response.status().is_success() {
            debug!(name, "registered with master");
            Ok(DispatchStatus::Success)
        } else if response.status() == reqwest::StatusCode::CONFLICT {
            // A conflicting registration will never clear on its own.
            warn!(name, "registration rejected as conflicting");
            Ok(DispatchStatus::Fatal)
        } else {
            warn!(name, status = %response.status(), "registration refused");
            Ok(DispatchStatus::Error)
        }
    }

    async fn deregister(&self, name: &str) -> SchedulerResult<DispatchStatus> {
        let url = format!("{}/api/v1/nodes/{name}", self.base_url);

        let response = self
            .http_client
            .delete(&url)
            .send()
            .await
            .map_err(|e| SchedulerError::RegistryUnavailable(e.to_string()))?;

        if response.status().is_success() {
            Ok(DispatchStatus::Success)
        } else {
            warn!(name, status = %response.status(), "deregistration refused");
            Ok(DispatchStatus::Error)
        }
    }

    async fn list_nodes(&self) -> SchedulerResult<Vec<NodeInfo>> {
        let url = format!("{}/api/v1/nodes", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| SchedulerError::RegistryUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SchedulerError::RegistryUnavailable(format!(
                "node listing failed: HTTP {}",
                response.status()
            )));
        }

        response
            .json::<Vec<NodeInfo>>()
            .await
            .map_err(|e| SchedulerError::RegistryUnavailable(format!("bad node listing: {e}")))
    }
}

/// HTTP client for per-node device control.
///
/// Device endpoints are routed through the master, addressed by node
/// id; the master proxies to the node's own controller.
pub struct HttpDeviceClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpDeviceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client: build_client(timeout),
        }
    }
}

#[async_trait]
impl DeviceClient for HttpDeviceClient {
    async fn load_protocol(&self, node: &NodeInfo, instruction: &str) -> SchedulerResult<String> {
        let url = format!("{}/api/v1/devices/{}/protocols", self.base_url, node.id);
        let body = json!({ "instruction": instruction });

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SchedulerError::DeviceDispatch {
                node: node.id.clone(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(SchedulerError::DeviceDispatch {
                node: node.id.clone(),
                message: format!("protocol load failed: HTTP {}", response.status()),
            });
        }

        #[derive(serde::Deserialize)]
        struct LoadResponse {
            protocol_id: String,
        }

        let loaded: LoadResponse =
            response
                .json()
                .await
                .map_err(|e| SchedulerError::DeviceDispatch {
                    node: node.id.clone(),
                    message: format!("bad protocol load response: {e}"),
                })?;

        Ok(loaded.protocol_id)
    }

    async fn add_work(
        &self,
        node: &NodeInfo,
        instructions: &[String],
        block_name: &str,
    ) -> SchedulerResult<DispatchStatus> {
        let url = format!("{}/api/v1/devices/{}/work", self.base_url, node.id);
        let body = json!({ "block_name": block_name, "instructions": instructions });

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SchedulerError::DeviceDispatch {
                node: node.id.clone(),
                message: e.to_string(),
            })?;

        if response.status().is_success() {
            debug!(node = %node.id, block = block_name, "work submitted");
            Ok(DispatchStatus::Success)
        } else {
            warn!(node = %node.id, status = %response.status(), "work submission refused");
            Ok(DispatchStatus::Error)
        }
    }
}

/// HTTP broadcaster of the scheduler's own coarse state.
pub struct HttpStateBroadcaster {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpStateBroadcaster {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client: build_client(timeout),
        }
    }
}

#[async_trait]
impl StateBroadcaster for HttpStateBroadcaster {
    async fn broadcast(
        &self,
        scheduler_id: &str,
        state: NodeState,
    ) -> SchedulerResult<DispatchStatus> {
        let url = format!("{}/api/v1/nodes/{scheduler_id}/state", self.base_url);
        let body = json!({ "state": state });

        let response = self
            .http_client
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SchedulerError::Broadcast(e.to_string()))?;

        if response.status().is_success() {
            Ok(DispatchStatus::Success)
        } else {
            Ok(DispatchStatus::Error)
        }
    }
}
