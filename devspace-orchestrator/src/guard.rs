//! Access and quota guard
//!
//! Pure validation over already-loaded state; runs before any mutation or
//! agent call so rejected requests are always safe to retry.

use crate::error::{OrchestratorError, Result};
use crate::workspace::{Workspace, WorkspaceAction, WorkspaceStatus};

pub const DEFAULT_WORKSPACE_QUOTA: i64 = 10;

/// Transition table for lifecycle actions. The transitional states
/// STARTING/STOPPING admit their own action again so a caller that
/// aborted mid-flight can retry and converge.
pub fn transition_allowed(status: WorkspaceStatus, action: WorkspaceAction) -> bool {
    use WorkspaceStatus::*;

    match action {
        WorkspaceAction::Start => {
            matches!(status, Stopped | Paused | Error | Creating | Starting)
        }
        WorkspaceAction::Pause => matches!(status, Running | Stopping),
        WorkspaceAction::Stop => matches!(status, Running | Paused | Stopping),
        WorkspaceAction::Delete => !matches!(status, Deleting),
    }
}

/// Status persisted while the agent call is in flight.
pub fn transitional_status(action: WorkspaceAction) -> WorkspaceStatus {
    match action {
        WorkspaceAction::Start => WorkspaceStatus::Starting,
        WorkspaceAction::Pause | WorkspaceAction::Stop => WorkspaceStatus::Stopping,
        WorkspaceAction::Delete => WorkspaceStatus::Deleting,
    }
}

/// Status committed once the action completes, whether the agent answered
/// or the transition was applied locally. DELETE lands on STOPPED with the
/// soft-delete marker set by the caller.
pub fn terminal_status(action: WorkspaceAction) -> WorkspaceStatus {
    match action {
        WorkspaceAction::Start => WorkspaceStatus::Running,
        WorkspaceAction::Pause => WorkspaceStatus::Paused,
        WorkspaceAction::Stop | WorkspaceAction::Delete => WorkspaceStatus::Stopped,
    }
}

/// Reject an illegal action before any state mutation. Checks, in order:
/// soft-delete marker, ownership, transition legality.
pub fn authorize(workspace: &Workspace, actor_id: &str, action: WorkspaceAction) -> Result<()> {
    if workspace.deleted_at.is_some() {
        return Err(OrchestratorError::NotFound(format!(
            "Workspace has been deleted: {}",
            workspace.id
        )));
    }

    if workspace.owner_id != actor_id {
        return Err(OrchestratorError::Forbidden(format!(
            "Workspace {} is owned by another user",
            workspace.id
        )));
    }

    if !transition_allowed(workspace.status, action) {
        return Err(OrchestratorError::InvalidTransition {
            action,
            status: workspace.status,
        });
    }

    Ok(())
}

/// Creation-only check: owners hold at most `limit` non-deleted workspaces.
pub fn check_quota(active_count: i64, limit: i64) -> Result<()> {
    if active_count >= limit {
        return Err(OrchestratorError::QuotaExceeded { limit });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn workspace(status: WorkspaceStatus) -> Workspace {
        let now = Utc::now();
        Workspace {
            id: "ws-1".to_string(),
            owner_id: "alice".to_string(),
            name: "test".to_string(),
            status,
            cpu_cores: 2,
            memory_gb: 4,
            storage_gb: 50,
            region: "eastus".to_string(),
            base_image: "node".to_string(),
            web_url: None,
            ssh_url: None,
            created_at: now,
            updated_at: now,
            last_accessed_at: None,
            stopped_at: None,
            deleted_at: None,
            version: 0,
        }
    }

    #[test]
    fn start_allowed_from_stopped_paused_error() {
        for status in [
            WorkspaceStatus::Stopped,
            WorkspaceStatus::Paused,
            WorkspaceStatus::Error,
            WorkspaceStatus::Creating,
            WorkspaceStatus::Starting,
        ] {
            assert!(transition_allowed(status, WorkspaceAction::Start));
        }
        assert!(!transition_allowed(
            WorkspaceStatus::Running,
            WorkspaceAction::Start
        ));
        assert!(!transition_allowed(
            WorkspaceStatus::Deleting,
            WorkspaceAction::Start
        ));
    }

    #[test]
    fn pause_requires_running() {
        assert!(transition_allowed(
            WorkspaceStatus::Running,
            WorkspaceAction::Pause
        ));
        assert!(!transition_allowed(
            WorkspaceStatus::Stopped,
            WorkspaceAction::Pause
        ));
        assert!(!transition_allowed(
            WorkspaceStatus::Paused,
            WorkspaceAction::Pause
        ));
    }

    #[test]
    fn stop_requires_running_or_paused() {
        assert!(transition_allowed(
            WorkspaceStatus::Running,
            WorkspaceAction::Stop
        ));
        assert!(transition_allowed(
            WorkspaceStatus::Paused,
            WorkspaceAction::Stop
        ));
        assert!(!transition_allowed(
            WorkspaceStatus::Stopped,
            WorkspaceAction::Stop
        ));
    }

    #[test]
    fn delete_allowed_from_everything_but_deleting() {
        for status in [
            WorkspaceStatus::Creating,
            WorkspaceStatus::Starting,
            WorkspaceStatus::Running,
            WorkspaceStatus::Stopping,
            WorkspaceStatus::Stopped,
            WorkspaceStatus::Paused,
            WorkspaceStatus::Error,
        ] {
            assert!(transition_allowed(status, WorkspaceAction::Delete));
        }
        assert!(!transition_allowed(
            WorkspaceStatus::Deleting,
            WorkspaceAction::Delete
        ));
    }

    #[test]
    fn deleted_workspace_rejects_all_actions() {
        let mut ws = workspace(WorkspaceStatus::Stopped);
        ws.deleted_at = Some(Utc::now());

        for action in [
            WorkspaceAction::Start,
            WorkspaceAction::Pause,
            WorkspaceAction::Stop,
            WorkspaceAction::Delete,
        ] {
            let err = authorize(&ws, "alice", action).expect_err("Deleted must reject");
            assert!(matches!(err, OrchestratorError::NotFound(_)));
        }
    }

    #[test]
    fn non_owner_is_forbidden() {
        let ws = workspace(WorkspaceStatus::Stopped);
        let err = authorize(&ws, "mallory", WorkspaceAction::Start).expect_err("Must reject");
        assert!(matches!(err, OrchestratorError::Forbidden(_)));
    }

    #[test]
    fn illegal_transition_is_rejected() {
        let ws = workspace(WorkspaceStatus::Stopped);
        let err = authorize(&ws, "alice", WorkspaceAction::Stop).expect_err("Must reject");
        assert!(matches!(
            err,
            OrchestratorError::InvalidTransition {
                action: WorkspaceAction::Stop,
                status: WorkspaceStatus::Stopped,
            }
        ));
    }

    #[test]
    fn quota_boundary() {
        assert!(check_quota(9, DEFAULT_WORKSPACE_QUOTA).is_ok());
        assert!(matches!(
            check_quota(10, DEFAULT_WORKSPACE_QUOTA),
            Err(OrchestratorError::QuotaExceeded { limit: 10 })
        ));
        assert!(matches!(
            check_quota(11, DEFAULT_WORKSPACE_QUOTA),
            Err(OrchestratorError::QuotaExceeded { .. })
        ));
    }
}
