//! Wire types for the agent API
//!
//! The agent speaks camelCase JSON. Every response follows the same
//! envelope: `{success, message, data?, error?, code?}`.

use serde::{Deserialize, Serialize};

/// Optional credentials forwarded to the agent at provision time so the
/// container comes up pre-configured for the owner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSecrets {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_public_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_user_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_user_email: Option<String>,
}


#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnvironmentRequest {
    pub workspace_id: String,
    pub user_id: String,
    pub name: String,
    pub cloud_region: String,
    pub cpu_cores: i64,
    #[serde(rename = "memoryGB")]
    pub memory_gb: i64,
    #[serde(rename = "storageGB")]
    pub storage_gb: i64,
    pub base_image: String,

    #[serde(flatten)]
    pub secrets: AgentSecrets,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartEnvironmentRequest {
    pub workspace_id: String,
    pub cloud_region: String,
    pub user_id: String,
    pub name: String,
    pub cpu_cores: i64,
    #[serde(rename = "memoryGB")]
    pub memory_gb: i64,
    #[serde(rename = "storageGB")]
    pub storage_gb: i64,
    pub base_image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopEnvironmentRequest {
    pub workspace_id: String,
    pub cloud_region: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEnvironmentRequest {
    pub workspace_id: String,
    pub cloud_region: String,
    pub force: bool,
}

/// Connection endpoints returned by the agent after a successful
/// create/start. Either field may be absent when the agent is still
/// wiring up ingress.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionUrls {
    pub web_url: Option<String>,
    pub ssh_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentPayload {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub connection_urls: Option<ConnectionUrls>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EnvironmentEnvelope {
    pub environment: EnvironmentPayload,
}

/// The agent's uniform response envelope.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AgentResponse<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    // No `default` attribute: it would add a `T: Default` bound, and an
    // absent key already deserializes to None.
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    pub code: Option<String>,
}
