use crate::error::{AgentError, Result};
use crate::types::{
    AgentResponse, CreateEnvironmentRequest, DeleteEnvironmentRequest, EnvironmentEnvelope,
    EnvironmentPayload, StartEnvironmentRequest, StopEnvironmentRequest,
};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Connection settings for the provisioning agent.
///
/// Timeouts reflect real latency profiles: the health probe should answer
/// fast, start/stop take tens of seconds, provisioning a fresh container
/// can take minutes.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Base URL of the agent service, without a trailing slash
    pub base_url: String,
    /// When false, every call short-circuits without touching the network
    pub enabled: bool,
    /// Budget for the advisory health probe
    pub health_timeout: Duration,
    /// Budget for start/stop/delete/activity calls
    pub action_timeout: Duration,
    /// Budget for environment creation
    pub create_timeout: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            enabled: false,
            health_timeout: Duration::from_secs(8),
            action_timeout: Duration::from_secs(90),
            create_timeout: Duration::from_secs(300),
        }
    }
}

impl AgentConfig {
    pub fn from_env() -> Self {
        let base_url = std::env::var("AGENT_API_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());

        let enabled = std::env::var("AGENT_API_ENABLED")
            .map(|v| v == "true")
            .unwrap_or(false);

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            enabled,
            health_timeout: env_duration("AGENT_API_HEALTH_TIMEOUT_SECS", 8),
            action_timeout: env_duration("AGENT_API_ACTION_TIMEOUT_SECS", 90),
            create_timeout: env_duration("AGENT_API_CREATE_TIMEOUT_SECS", 300),
        }
    }
}

fn env_duration(var: &str, default_secs: u64) -> Duration {
    let secs = std::env::var(var)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default_secs);
    Duration::from_secs(secs)
}

/// Result of the advisory health probe. A 503 from the agent means
/// degraded-but-responsive, which is still worth attempting real calls
/// against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentHealth {
    Available,
    Unavailable,
}

#[derive(Clone)]
pub struct AgentClient {
    http: Client,
    config: AgentConfig,
}

impl AgentClient {
    pub fn new(config: AgentConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Probe `GET /health`. Never fails: any outcome other than a 200 or
    /// 503 response within the budget is reported as `Unavailable`. The
    /// result is advisory; a failed probe does not block real calls.
    pub async fn probe_health(&self) -> AgentHealth {
        if !self.config.enabled {
            return AgentHealth::Unavailable;
        }

        let url = format!("{}/health", self.config.base_url);
        match self
            .http
            .get(&url)
            .timeout(self.config.health_timeout)
            .send()
            .await
        {
            Ok(resp)
                if resp.status().is_success()
                    || resp.status() == StatusCode::SERVICE_UNAVAILABLE =>
            {
                AgentHealth::Available
            }
            Ok(resp) => {
                warn!("Agent health probe returned status {}", resp.status());
                AgentHealth::Unavailable
            }
            Err(e) => {
                warn!(
                    "Agent health probe failed after {}s: {}",
                    self.config.health_timeout.as_secs(),
                    e
                );
                AgentHealth::Unavailable
            }
        }
    }

    /// Provision a new environment. Slow: budgeted at the create timeout.
    pub async fn create_environment(
        &self,
        req: &CreateEnvironmentRequest,
    ) -> Result<EnvironmentPayload> {
        let response: AgentResponse<EnvironmentEnvelope> = self
            .request(
                Method::POST,
                "/api/v1/environments",
                "create environment",
                req,
                self.config.create_timeout,
            )
            .await?;

        environment_from(response)
    }

    /// Start an existing environment.
    pub async fn start_environment(
        &self,
        req: &StartEnvironmentRequest,
    ) -> Result<EnvironmentPayload> {
        let response: AgentResponse<EnvironmentEnvelope> = self
            .request(
                Method::POST,
                "/api/v1/environments/start",
                "start environment",
                req,
                self.config.action_timeout,
            )
            .await?;

        environment_from(response)
    }

    /// Stop (or pause) a running environment.
    pub async fn stop_environment(&self, req: &StopEnvironmentRequest) -> Result<()> {
        let _: AgentResponse<serde_json::Value> = self
            .request(
                Method::POST,
                "/api/v1/environments/stop",
                "stop environment",
                req,
                self.config.action_timeout,
            )
            .await?;

        Ok(())
    }

    /// Tear down an environment. `force` in the request permits deleting
    /// one that is still running.
    pub async fn delete_environment(&self, req: &DeleteEnvironmentRequest) -> Result<()> {
        let _: AgentResponse<serde_json::Value> = self
            .request(
                Method::DELETE,
                "/api/v1/environments",
                "delete environment",
                req,
                self.config.action_timeout,
            )
            .await?;

        Ok(())
    }

    /// Tell the agent the workspace was just used, so its idle-shutdown
    /// clock resets.
    pub async fn report_activity(&self, workspace_id: &str) -> Result<()> {
        let path = format!("/api/v1/environments/{}/activity", workspace_id);
        let _: AgentResponse<serde_json::Value> = self
            .request(
                Method::POST,
                &path,
                "report activity",
                &serde_json::json!({}),
                self.config.action_timeout,
            )
            .await?;

        Ok(())
    }

    /// Single-attempt request with envelope normalization. A non-2xx
    /// status, a body that fails to parse, or `success: false` all come
    /// back as `CallFailed`; only a transport timeout is `Timeout`.
    async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        operation: &'static str,
        body: &B,
        timeout: Duration,
    ) -> Result<AgentResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        if !self.config.enabled {
            return Err(AgentError::Disabled);
        }

        let url = format!("{}{}", self.config.base_url, path);
        debug!("Agent request: {} {}", method, url);

        let response = self
            .http
            .request(method, &url)
            .json(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AgentError::Timeout {
                        operation,
                        timeout_secs: timeout.as_secs(),
                    }
                } else {
                    AgentError::CallFailed {
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| AgentError::CallFailed {
            reason: e.to_string(),
        })?;

        let parsed: Option<AgentResponse<T>> = serde_json::from_str(&text).ok();

        match parsed {
            Some(envelope) if status.is_success() && envelope.success => Ok(envelope),
            Some(envelope) => Err(AgentError::CallFailed {
                reason: envelope
                    .message
                    .or(envelope.error)
                    .unwrap_or_else(|| format!("{} returned status {}", operation, status)),
            }),
            None => Err(AgentError::CallFailed {
                reason: if text.is_empty() {
                    format!("{} returned status {} with empty body", operation, status)
                } else {
                    format!("{} returned unparseable body (status {})", operation, status)
                },
            }),
        }
    }
}

fn environment_from(
    response: AgentResponse<EnvironmentEnvelope>,
) -> Result<EnvironmentPayload> {
    response
        .data
        .map(|envelope| envelope.environment)
        .ok_or_else(|| AgentError::CallFailed {
            reason: "agent returned an empty environment payload".to_string(),
        })
}
