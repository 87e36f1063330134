use crate::error::{OrchestratorError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use utoipa::ToSchema;

/// A user's provisioned development environment.
///
/// `web_url`/`ssh_url` hold the last known-good connection endpoints; a
/// failed agent call never clears them. `version` increments on every
/// status write and backs the compare-and-swap that serializes concurrent
/// actions on one workspace.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Workspace {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub status: WorkspaceStatus,

    pub cpu_cores: i64,
    pub memory_gb: i64,
    pub storage_gb: i64,
    pub region: String,
    pub base_image: String,

    pub web_url: Option<String>,
    pub ssh_url: Option<String>,

    #[serde(serialize_with = "serialize_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(serialize_with = "serialize_datetime")]
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(serialize_with = "serialize_optional_datetime")]
    pub last_accessed_at: Option<DateTime<Utc>>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(serialize_with = "serialize_optional_datetime")]
    pub stopped_at: Option<DateTime<Utc>>,

    /// Soft-delete marker. Once set, no lifecycle action may mutate the
    /// record again.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(serialize_with = "serialize_optional_datetime")]
    pub deleted_at: Option<DateTime<Utc>>,

    #[serde(skip)]
    pub version: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "lowercase")]
pub enum WorkspaceStatus {
    Creating,
    Starting,
    Running,
    Stopping,
    Stopped,
    Paused,
    Deleting,
    Error,
}

impl std::fmt::Display for WorkspaceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WorkspaceStatus::Creating => "CREATING",
            WorkspaceStatus::Starting => "STARTING",
            WorkspaceStatus::Running => "RUNNING",
            WorkspaceStatus::Stopping => "STOPPING",
            WorkspaceStatus::Stopped => "STOPPED",
            WorkspaceStatus::Paused => "PAUSED",
            WorkspaceStatus::Deleting => "DELETING",
            WorkspaceStatus::Error => "ERROR",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "lowercase")]
pub enum WorkspaceAction {
    Start,
    Pause,
    Stop,
    Delete,
}

impl std::fmt::Display for WorkspaceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WorkspaceAction::Start => "START",
            WorkspaceAction::Pause => "PAUSE",
            WorkspaceAction::Stop => "STOP",
            WorkspaceAction::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateWorkspaceRequest {
    pub name: String,
    pub region: String,
    pub cpu_cores: i64,
    pub memory_gb: i64,
    pub storage_gb: i64,
    pub base_image: String,
}

impl CreateWorkspaceRequest {
    /// Reject malformed input before any record exists.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() || self.name.len() > 64 {
            return Err(OrchestratorError::Validation(
                "Workspace name must be 1-64 characters".to_string(),
            ));
        }
        if self.region.trim().is_empty() {
            return Err(OrchestratorError::Validation(
                "Region must not be empty".to_string(),
            ));
        }
        if self.base_image.trim().is_empty() {
            return Err(OrchestratorError::Validation(
                "Base image must not be empty".to_string(),
            ));
        }
        if !(1..=16).contains(&self.cpu_cores) {
            return Err(OrchestratorError::Validation(
                "CPU cores must be between 1 and 16".to_string(),
            ));
        }
        if !(1..=64).contains(&self.memory_gb) {
            return Err(OrchestratorError::Validation(
                "Memory must be between 1 and 64 GB".to_string(),
            ));
        }
        if !(1..=1024).contains(&self.storage_gb) {
            return Err(OrchestratorError::Validation(
                "Storage must be between 1 and 1024 GB".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorkspaceFilters {
    pub owner: Option<String>,
    pub status: Option<WorkspaceStatus>,
}

/// Field changes applied together with a status write. URLs merge: a
/// `None` leaves the stored value untouched, so a degraded transition
/// keeps the last known-good endpoints.
#[derive(Debug, Clone, Default)]
pub struct StatusPatch {
    pub web_url: Option<String>,
    pub ssh_url: Option<String>,
    pub touch_last_accessed: bool,
    pub set_stopped_at: bool,
    pub clear_stopped_at: bool,
    pub set_deleted_at: bool,
}

/// Persistence for workspace records. All status writes go through
/// `update_status`, which compare-and-swaps on `version`; nothing else
/// mutates `status`.
#[derive(Clone)]
pub struct WorkspaceStore {
    pool: SqlitePool,
}

impl WorkspaceStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the database pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn insert(&self, workspace: &Workspace) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO workspaces
                (id, owner_id, name, status, cpu_cores, memory_gb, storage_gb,
                 region, base_image, web_url, ssh_url,
                 created_at, updated_at, last_accessed_at, stopped_at, deleted_at, version)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&workspace.id)
        .bind(&workspace.owner_id)
        .bind(&workspace.name)
        .bind(workspace.status)
        .bind(workspace.cpu_cores)
        .bind(workspace.memory_gb)
        .bind(workspace.storage_gb)
        .bind(&workspace.region)
        .bind(&workspace.base_image)
        .bind(&workspace.web_url)
        .bind(&workspace.ssh_url)
        .bind(workspace.created_at.timestamp())
        .bind(workspace.updated_at.timestamp())
        .bind(workspace.last_accessed_at.map(|dt| dt.timestamp()))
        .bind(workspace.stopped_at.map(|dt| dt.timestamp()))
        .bind(workspace.deleted_at.map(|dt| dt.timestamp()))
        .bind(workspace.version)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch a workspace row, soft-deleted or not. Callers that must not
    /// see deleted records go through the guard.
    pub async fn get(&self, id: &str) -> Result<Workspace> {
        let row = sqlx::query_as::<_, WorkspaceRow>("SELECT * FROM workspaces WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| OrchestratorError::NotFound(format!("Workspace {}", id)))?;

        Ok(row.into())
    }

    /// List non-deleted workspaces with optional filters
    pub async fn list(&self, filters: WorkspaceFilters) -> Result<Vec<Workspace>> {
        let mut query = "SELECT * FROM workspaces WHERE deleted_at IS NULL".to_string();

        if filters.owner.is_some() {
            query.push_str(" AND owner_id = ?");
        }
        if filters.status.is_some() {
            query.push_str(" AND status = ?");
        }

        query.push_str(" ORDER BY created_at DESC");

        let mut q = sqlx::query_as::<_, WorkspaceRow>(&query);

        if let Some(owner) = &filters.owner {
            q = q.bind(owner);
        }
        if let Some(status) = &filters.status {
            q = q.bind(status);
        }

        let rows = q.fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(|row| row.into()).collect())
    }

    /// Count an owner's non-deleted workspaces, for the quota check.
    pub async fn count_active_for_owner(&self, owner_id: &str) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM workspaces WHERE owner_id = ? AND deleted_at IS NULL",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Compare-and-swap status write. Fails with `Conflict` when
    /// `expected_version` is stale, so two concurrent actions on the same
    /// workspace cannot interleave their transitional writes.
    pub async fn update_status(
        &self,
        id: &str,
        expected_version: i64,
        status: WorkspaceStatus,
        patch: StatusPatch,
    ) -> Result<Workspace> {
        let now = Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            UPDATE workspaces
            SET status = ?,
                updated_at = ?,
                version = version + 1,
                web_url = COALESCE(?, web_url),
                ssh_url = COALESCE(?, ssh_url),
                last_accessed_at = CASE WHEN ? THEN ? ELSE last_accessed_at END,
                stopped_at = CASE WHEN ? THEN ? WHEN ? THEN NULL ELSE stopped_at END,
                deleted_at = CASE WHEN ? THEN ? ELSE deleted_at END
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(status)
        .bind(now)
        .bind(&patch.web_url)
        .bind(&patch.ssh_url)
        .bind(patch.touch_last_accessed)
        .bind(now)
        .bind(patch.set_stopped_at)
        .bind(now)
        .bind(patch.clear_stopped_at)
        .bind(patch.set_deleted_at)
        .bind(now)
        .bind(id)
        .bind(expected_version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Either the row is gone or someone else won the race.
            return match self.get(id).await {
                Ok(_) => Err(OrchestratorError::Conflict(id.to_string())),
                Err(e) => Err(e),
            };
        }

        self.get(id).await
    }

    /// Bump `last_accessed_at` without touching status or version.
    pub async fn touch_last_accessed(&self, id: &str) -> Result<()> {
        let now = Utc::now().timestamp();

        let result = sqlx::query("UPDATE workspaces SET last_accessed_at = ? WHERE id = ?")
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(OrchestratorError::NotFound(format!("Workspace {}", id)));
        }

        Ok(())
    }
}

// Internal row type for sqlx
#[derive(sqlx::FromRow)]
struct WorkspaceRow {
    id: String,
    owner_id: String,
    name: String,
    status: WorkspaceStatus,
    cpu_cores: i64,
    memory_gb: i64,
    storage_gb: i64,
    region: String,
    base_image: String,
    web_url: Option<String>,
    ssh_url: Option<String>,
    created_at: i64,
    updated_at: i64,
    last_accessed_at: Option<i64>,
    stopped_at: Option<i64>,
    deleted_at: Option<i64>,
    version: i64,
}

impl From<WorkspaceRow> for Workspace {
    fn from(row: WorkspaceRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            status: row.status,
            cpu_cores: row.cpu_cores,
            memory_gb: row.memory_gb,
            storage_gb: row.storage_gb,
            region: row.region,
            base_image: row.base_image,
            web_url: row.web_url,
            ssh_url: row.ssh_url,
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::from_timestamp(row.updated_at, 0).unwrap_or_default(),
            last_accessed_at: row
                .last_accessed_at
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
            stopped_at: row.stopped_at.and_then(|ts| DateTime::from_timestamp(ts, 0)),
            deleted_at: row.deleted_at.and_then(|ts| DateTime::from_timestamp(ts, 0)),
            version: row.version,
        }
    }
}

// Serialize DateTime as RFC 3339 / ISO 8601 string
pub(crate) fn serialize_datetime<S>(
    dt: &DateTime<Utc>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&dt.to_rfc3339())
}

pub(crate) fn serialize_optional_datetime<S>(
    dt: &Option<DateTime<Utc>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match dt {
        Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
        None => serializer.serialize_none(),
    }
}
