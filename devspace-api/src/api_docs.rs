use devspace_orchestrator::{
    ActionLogEntry, ActionOutcome, ActionStatus, CreateOutcome, CreateWorkspaceRequest,
    Workspace, WorkspaceAction, WorkspaceStatus,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::health::readiness_check,
        crate::routes::workspaces::list_workspaces,
        crate::routes::workspaces::create_workspace,
        crate::routes::workspaces::get_workspace,
        crate::routes::workspaces::delete_workspace,
        crate::routes::workspaces::start_workspace,
        crate::routes::workspaces::stop_workspace,
        crate::routes::workspaces::pause_workspace,
        crate::routes::workspaces::report_activity,
        crate::routes::actions::list_actions,
        crate::routes::actions::get_action,
    ),
    components(
        schemas(
            Workspace,
            WorkspaceStatus,
            WorkspaceAction,
            CreateWorkspaceRequest,
            CreateOutcome,
            ActionOutcome,
            ActionLogEntry,
            ActionStatus
        )
    ),
    tags(
        (name = "devspace-api", description = "Workspace Lifecycle API")
    )
)]
pub struct ApiDoc;
