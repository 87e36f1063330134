//! Action audit log
//!
//! One entry per lifecycle action attempt, created PENDING before any
//! agent traffic and finalized to SUCCESS or FAILED when the orchestrator
//! commits. Entries are never deleted; retried actions create new rows.

use crate::error::{OrchestratorError, Result};
use crate::workspace::{serialize_datetime, serialize_optional_datetime, WorkspaceAction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActionLogEntry {
    pub id: String,
    pub workspace_id: String,
    pub actor_id: String,
    pub action: WorkspaceAction,
    pub status: ActionStatus,
    pub message: Option<String>,

    #[serde(serialize_with = "serialize_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(serialize_with = "serialize_optional_datetime")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "lowercase")]
pub enum ActionStatus {
    Pending,
    Success,
    Failed,
}

#[derive(Debug, Clone, Default)]
pub struct ActionLogFilters {
    pub workspace_id: Option<String>,
    pub action: Option<WorkspaceAction>,
    pub status: Option<ActionStatus>,
}

#[derive(Clone)]
pub struct AuditLog {
    pool: SqlitePool,
}

impl AuditLog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record an attempt before it runs.
    pub async fn create_pending(
        &self,
        workspace_id: &str,
        actor_id: &str,
        action: WorkspaceAction,
    ) -> Result<ActionLogEntry> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO action_log (id, workspace_id, actor_id, action, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(workspace_id)
        .bind(actor_id)
        .bind(action)
        .bind(ActionStatus::Pending)
        .bind(now.timestamp())
        .execute(&self.pool)
        .await?;

        self.get(&id).await
    }

    /// Finalize an entry to SUCCESS or FAILED with its outcome message.
    pub async fn complete(&self, id: &str, status: ActionStatus, message: &str) -> Result<()> {
        let now = Utc::now().timestamp();

        let result = sqlx::query(
            "UPDATE action_log SET status = ?, message = ?, completed_at = ? WHERE id = ?",
        )
        .bind(status)
        .bind(message)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(OrchestratorError::NotFound(format!(
                "Action log entry {}",
                id
            )));
        }

        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<ActionLogEntry> {
        let row = sqlx::query_as::<_, ActionLogRow>("SELECT * FROM action_log WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                OrchestratorError::NotFound(format!("Action log entry {}", id))
            })?;

        Ok(row.into())
    }

    pub async fn list(&self, filters: ActionLogFilters) -> Result<Vec<ActionLogEntry>> {
        let mut query = "SELECT * FROM action_log WHERE 1=1".to_string();

        if filters.workspace_id.is_some() {
            query.push_str(" AND workspace_id = ?");
        }
        if filters.action.is_some() {
            query.push_str(" AND action = ?");
        }
        if filters.status.is_some() {
            query.push_str(" AND status = ?");
        }

        query.push_str(" ORDER BY created_at DESC");

        let mut q = sqlx::query_as::<_, ActionLogRow>(&query);

        if let Some(wid) = &filters.workspace_id {
            q = q.bind(wid);
        }
        if let Some(action) = &filters.action {
            q = q.bind(action);
        }
        if let Some(status) = &filters.status {
            q = q.bind(status);
        }

        let rows = q.fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(|row| row.into()).collect())
    }
}

#[derive(sqlx::FromRow)]
struct ActionLogRow {
    id: String,
    workspace_id: String,
    actor_id: String,
    action: WorkspaceAction,
    status: ActionStatus,
    message: Option<String>,
    created_at: i64,
    completed_at: Option<i64>,
}

impl From<ActionLogRow> for ActionLogEntry {
    fn from(row: ActionLogRow) -> Self {
        Self {
            id: row.id,
            workspace_id: row.workspace_id,
            actor_id: row.actor_id,
            action: row.action,
            status: row.status,
            message: row.message,
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_default(),
            completed_at: row
                .completed_at
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
        }
    }
}
