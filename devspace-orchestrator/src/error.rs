use crate::workspace::{WorkspaceAction, WorkspaceStatus};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// Errors surfaced by the orchestration layer. Agent failures are not
/// represented here: they are absorbed into degraded-mode outcomes and
/// never fail a request.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Cannot {action} a workspace in {status} state")]
    InvalidTransition {
        action: WorkspaceAction,
        status: WorkspaceStatus,
    },

    #[error("Maximum workspace limit reached ({limit})")]
    QuotaExceeded { limit: i64 },

    #[error("Workspace {0} was modified concurrently; retry the action")]
    Conflict(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
