//! Lifecycle state machine
//!
//! Every state-changing request flows through `WorkspaceOrchestrator`:
//! guard, PENDING audit entry, transitional status write, one agent call,
//! terminal status write, audit finalization. Agent failures are absorbed
//! into a degraded local transition — the platform stays usable while the
//! agent is down — and only unexpected errors (persistence, stale version)
//! propagate to the caller.

use crate::audit::{ActionLogEntry, ActionLogFilters, ActionStatus, AuditLog};
use crate::error::Result;
use crate::guard;
use crate::workspace::{
    CreateWorkspaceRequest, StatusPatch, Workspace, WorkspaceAction, WorkspaceFilters,
    WorkspaceStatus, WorkspaceStore,
};
use chrono::Utc;
use devspace_agent::{
    AgentClient, AgentError, AgentHealth, AgentSecrets, ConnectionUrls,
    CreateEnvironmentRequest, DeleteEnvironmentRequest, StartEnvironmentRequest,
    StopEnvironmentRequest,
};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Result of a lifecycle action. `via_agent` distinguishes "the agent
/// really did it" from "applied locally only" — both are successes from
/// the caller's point of view.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActionOutcome {
    pub workspace: Workspace,
    pub message: String,
    pub via_agent: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateOutcome {
    pub workspace: Workspace,
    pub message: String,
    pub provisioned: bool,
}

#[derive(Clone)]
pub struct WorkspaceOrchestrator {
    store: WorkspaceStore,
    audit: AuditLog,
    agent: AgentClient,
    quota_limit: i64,
}

impl WorkspaceOrchestrator {
    pub fn new(pool: SqlitePool, agent: AgentClient, quota_limit: i64) -> Self {
        Self {
            store: WorkspaceStore::new(pool.clone()),
            audit: AuditLog::new(pool),
            agent,
            quota_limit,
        }
    }

    pub fn store(&self) -> &WorkspaceStore {
        &self.store
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Create a workspace record, then try to provision it. The record is
    /// persisted as CREATING before the agent call so a crash mid-provision
    /// leaves a recoverable row instead of losing the intent.
    pub async fn create_workspace(
        &self,
        owner_id: &str,
        req: CreateWorkspaceRequest,
    ) -> Result<CreateOutcome> {
        req.validate()?;

        let active = self.store.count_active_for_owner(owner_id).await?;
        guard::check_quota(active, self.quota_limit)?;

        let now = Utc::now();
        let workspace = Workspace {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            name: req.name.clone(),
            status: WorkspaceStatus::Creating,
            cpu_cores: req.cpu_cores,
            memory_gb: req.memory_gb,
            storage_gb: req.storage_gb,
            region: req.region.clone(),
            base_image: req.base_image.clone(),
            web_url: None,
            ssh_url: None,
            created_at: now,
            updated_at: now,
            last_accessed_at: None,
            stopped_at: None,
            deleted_at: None,
            version: 0,
        };
        self.store.insert(&workspace).await?;

        info!(
            "Creating workspace {} for {} in {}",
            workspace.id, owner_id, workspace.region
        );

        self.probe_before("CREATE").await;

        let agent_request = CreateEnvironmentRequest {
            workspace_id: workspace.id.clone(),
            user_id: workspace.owner_id.clone(),
            name: workspace.name.clone(),
            cloud_region: workspace.region.clone(),
            cpu_cores: workspace.cpu_cores,
            memory_gb: workspace.memory_gb,
            storage_gb: workspace.storage_gb,
            base_image: workspace.base_image.clone(),
            secrets: AgentSecrets::default(),
        };

        let (status, patch, message, provisioned) =
            match self.agent.create_environment(&agent_request).await {
                Ok(env) => {
                    let urls = env.connection_urls.unwrap_or_default();
                    (
                        WorkspaceStatus::Running,
                        StatusPatch {
                            web_url: urls.web_url,
                            ssh_url: urls.ssh_url,
                            touch_last_accessed: true,
                            ..Default::default()
                        },
                        "Workspace created and provisioned via Agent API".to_string(),
                        true,
                    )
                }
                Err(AgentError::Disabled) => (
                    WorkspaceStatus::Stopped,
                    StatusPatch::default(),
                    "Workspace created. Agent API is disabled - start manually when ready."
                        .to_string(),
                    false,
                ),
                Err(e) => (
                    WorkspaceStatus::Stopped,
                    StatusPatch::default(),
                    format!("Workspace created but agent provisioning failed: {}", e),
                    false,
                ),
            };

        let workspace = self
            .store
            .update_status(&workspace.id, workspace.version, status, patch)
            .await?;

        info!("Workspace {} created: {}", workspace.id, message);

        Ok(CreateOutcome {
            workspace,
            message,
            provisioned,
        })
    }

    /// Run a lifecycle action end to end. The audit entry always leaves
    /// PENDING before this returns: SUCCESS for applied (even degraded)
    /// transitions, FAILED when an unexpected error propagates.
    pub async fn perform_action(
        &self,
        action: WorkspaceAction,
        workspace_id: &str,
        actor_id: &str,
    ) -> Result<ActionOutcome> {
        let workspace = self.store.get(workspace_id).await?;
        guard::authorize(&workspace, actor_id, action)?;

        let entry = self
            .audit
            .create_pending(workspace_id, actor_id, action)
            .await?;

        info!(
            "{} started for workspace {} by {}",
            action, workspace_id, actor_id
        );

        match self.apply(action, workspace).await {
            Ok(outcome) => {
                self.audit
                    .complete(&entry.id, ActionStatus::Success, &outcome.message)
                    .await?;
                info!(
                    "{} completed for workspace {}: {}",
                    action, workspace_id, outcome.message
                );
                Ok(outcome)
            }
            Err(e) => {
                let reason = e.to_string();
                if let Err(log_err) = self
                    .audit
                    .complete(&entry.id, ActionStatus::Failed, &reason)
                    .await
                {
                    error!(
                        "Failed to finalize action log entry {}: {}",
                        entry.id, log_err
                    );
                }
                error!("{} failed for workspace {}: {}", action, workspace_id, reason);
                Err(e)
            }
        }
    }

    /// Transitional write, agent call, terminal write. Only store errors
    /// escape; the agent result merely decides between "via Agent API" and
    /// a degraded local transition.
    async fn apply(&self, action: WorkspaceAction, workspace: Workspace) -> Result<ActionOutcome> {
        let in_flight = self
            .store
            .update_status(
                &workspace.id,
                workspace.version,
                guard::transitional_status(action),
                StatusPatch::default(),
            )
            .await?;

        self.probe_before(&action.to_string()).await;

        let agent_result = self.call_agent(action, &workspace).await;

        let mut patch = match action {
            WorkspaceAction::Start => StatusPatch {
                touch_last_accessed: true,
                clear_stopped_at: true,
                ..Default::default()
            },
            WorkspaceAction::Pause | WorkspaceAction::Stop => StatusPatch {
                set_stopped_at: true,
                ..Default::default()
            },
            WorkspaceAction::Delete => StatusPatch {
                set_deleted_at: true,
                ..Default::default()
            },
        };

        let (message, via_agent) = match agent_result {
            Ok(urls) => {
                if let Some(urls) = urls {
                    patch.web_url = urls.web_url;
                    patch.ssh_url = urls.ssh_url;
                }
                (
                    format!("Workspace {} via Agent API", past_tense(action)),
                    true,
                )
            }
            Err(AgentError::Disabled) => {
                (format!("Agent API disabled. {}", local_note(action)), false)
            }
            Err(e) => (
                format!("Agent API unavailable: {}. {}", e, local_note(action)),
                false,
            ),
        };

        let workspace = self
            .store
            .update_status(
                &workspace.id,
                in_flight.version,
                guard::terminal_status(action),
                patch,
            )
            .await?;

        Ok(ActionOutcome {
            workspace,
            message,
            via_agent,
        })
    }

    /// One agent call per action. DELETE always forces so running
    /// workspaces can be torn down.
    async fn call_agent(
        &self,
        action: WorkspaceAction,
        workspace: &Workspace,
    ) -> std::result::Result<Option<ConnectionUrls>, AgentError> {
        match action {
            WorkspaceAction::Start => {
                let env = self
                    .agent
                    .start_environment(&StartEnvironmentRequest {
                        workspace_id: workspace.id.clone(),
                        cloud_region: workspace.region.clone(),
                        user_id: workspace.owner_id.clone(),
                        name: workspace.name.clone(),
                        cpu_cores: workspace.cpu_cores,
                        memory_gb: workspace.memory_gb,
                        storage_gb: workspace.storage_gb,
                        base_image: workspace.base_image.clone(),
                    })
                    .await?;
                Ok(env.connection_urls)
            }
            WorkspaceAction::Pause | WorkspaceAction::Stop => {
                self.agent
                    .stop_environment(&StopEnvironmentRequest {
                        workspace_id: workspace.id.clone(),
                        cloud_region: workspace.region.clone(),
                    })
                    .await?;
                Ok(None)
            }
            WorkspaceAction::Delete => {
                self.agent
                    .delete_environment(&DeleteEnvironmentRequest {
                        workspace_id: workspace.id.clone(),
                        cloud_region: workspace.region.clone(),
                        force: true,
                    })
                    .await?;
                Ok(None)
            }
        }
    }

    /// Advisory health probe. A failed probe is logged and ignored: the
    /// real call decides.
    async fn probe_before(&self, action: &str) {
        if self.agent.is_enabled() && self.agent.probe_health().await == AgentHealth::Unavailable {
            warn!("Agent health probe failed before {}; attempting anyway", action);
        }
    }

    /// Bump the workspace's activity clock and forward it to the agent
    /// best-effort so idle shutdown does not reclaim a busy workspace.
    pub async fn record_activity(&self, workspace_id: &str, actor_id: &str) -> Result<Workspace> {
        let workspace = self.get_workspace_for(workspace_id, actor_id).await?;

        if self.agent.is_enabled() {
            if let Err(e) = self.agent.report_activity(workspace_id).await {
                warn!("Activity report for {} failed: {}", workspace_id, e);
            }
        }

        Ok(workspace)
    }

    /// Owner-scoped fetch. A successful read counts as activity and bumps
    /// `last_accessed_at`; only `record_activity` also notifies the agent.
    pub async fn get_workspace_for(&self, id: &str, actor_id: &str) -> Result<Workspace> {
        let workspace = self.get_workspace(id).await?;

        if workspace.owner_id != actor_id {
            return Err(crate::error::OrchestratorError::Forbidden(format!(
                "Workspace {} is owned by another user",
                id
            )));
        }

        self.store.touch_last_accessed(id).await?;
        self.store.get(id).await
    }

    /// Fetch a workspace, treating soft-deleted records as gone.
    pub async fn get_workspace(&self, id: &str) -> Result<Workspace> {
        let workspace = self.store.get(id).await?;
        if workspace.deleted_at.is_some() {
            return Err(crate::error::OrchestratorError::NotFound(format!(
                "Workspace has been deleted: {}",
                id
            )));
        }
        Ok(workspace)
    }

    pub async fn list_workspaces(&self, filters: WorkspaceFilters) -> Result<Vec<Workspace>> {
        self.store.list(filters).await
    }

    pub async fn list_actions(&self, filters: ActionLogFilters) -> Result<Vec<ActionLogEntry>> {
        self.audit.list(filters).await
    }

    pub async fn get_action(&self, id: &str) -> Result<ActionLogEntry> {
        self.audit.get(id).await
    }
}

fn past_tense(action: WorkspaceAction) -> &'static str {
    match action {
        WorkspaceAction::Start => "started",
        WorkspaceAction::Pause => "paused",
        WorkspaceAction::Stop => "stopped",
        WorkspaceAction::Delete => "deleted",
    }
}

fn local_note(action: WorkspaceAction) -> &'static str {
    match action {
        WorkspaceAction::Start => "Workspace marked as RUNNING locally.",
        WorkspaceAction::Pause => "Workspace paused locally.",
        WorkspaceAction::Stop => "Workspace stopped locally.",
        WorkspaceAction::Delete => "Workspace deleted locally.",
    }
}
