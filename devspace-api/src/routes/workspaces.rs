use crate::{auth::AuthenticatedUser, error::ApiResult, state::AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use devspace_orchestrator::{
    ActionOutcome, CreateOutcome, CreateWorkspaceRequest, Workspace, WorkspaceAction,
    WorkspaceFilters, WorkspaceStatus,
};
use serde::Deserialize;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/workspaces",
            get(list_workspaces).post(create_workspace),
        )
        .route(
            "/api/v1/workspaces/{id}",
            get(get_workspace).delete(delete_workspace),
        )
        .route("/api/v1/workspaces/{id}/start", post(start_workspace))
        .route("/api/v1/workspaces/{id}/stop", post(stop_workspace))
        .route("/api/v1/workspaces/{id}/pause", post(pause_workspace))
        .route("/api/v1/workspaces/{id}/activity", post(report_activity))
}

#[derive(Debug, Deserialize)]
pub(crate) struct WorkspacesQuery {
    status: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/workspaces",
    request_body = CreateWorkspaceRequest,
    responses((status = 201, body = CreateOutcome))
)]
pub(crate) async fn create_workspace(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Json(req): Json<CreateWorkspaceRequest>,
) -> ApiResult<(StatusCode, Json<CreateOutcome>)> {
    let outcome = state.orchestrator.create_workspace(&user.id, req).await?;

    Ok((StatusCode::CREATED, Json(outcome)))
}

#[utoipa::path(
    get,
    path = "/api/v1/workspaces",
    responses((status = 200, body = [Workspace]))
)]
pub(crate) async fn list_workspaces(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Query(query): Query<WorkspacesQuery>,
) -> ApiResult<Json<Vec<Workspace>>> {
    // Parse status from string, tolerating lowercase
    let status = query.status.and_then(|s| {
        serde_json::from_str::<WorkspaceStatus>(&format!("\"{}\"", s.to_uppercase())).ok()
    });

    let filters = WorkspaceFilters {
        owner: Some(user.id),
        status,
    };

    let workspaces = state.orchestrator.list_workspaces(filters).await?;

    Ok(Json(workspaces))
}

#[utoipa::path(
    get,
    path = "/api/v1/workspaces/{id}",
    responses((status = 200, body = Workspace))
)]
pub(crate) async fn get_workspace(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Workspace>> {
    // Reads count as activity: a successful fetch bumps last_accessed_at.
    let workspace = state.orchestrator.get_workspace_for(&id, &user.id).await?;

    Ok(Json(workspace))
}

#[utoipa::path(
    delete,
    path = "/api/v1/workspaces/{id}",
    responses((status = 200, body = ActionOutcome))
)]
pub(crate) async fn delete_workspace(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<ActionOutcome>> {
    let outcome = state
        .orchestrator
        .perform_action(WorkspaceAction::Delete, &id, &user.id)
        .await?;

    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/api/v1/workspaces/{id}/start",
    responses((status = 200, body = ActionOutcome))
)]
pub(crate) async fn start_workspace(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<ActionOutcome>> {
    let outcome = state
        .orchestrator
        .perform_action(WorkspaceAction::Start, &id, &user.id)
        .await?;

    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/api/v1/workspaces/{id}/stop",
    responses((status = 200, body = ActionOutcome))
)]
pub(crate) async fn stop_workspace(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<ActionOutcome>> {
    let outcome = state
        .orchestrator
        .perform_action(WorkspaceAction::Stop, &id, &user.id)
        .await?;

    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/api/v1/workspaces/{id}/pause",
    responses((status = 200, body = ActionOutcome))
)]
pub(crate) async fn pause_workspace(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<ActionOutcome>> {
    let outcome = state
        .orchestrator
        .perform_action(WorkspaceAction::Pause, &id, &user.id)
        .await?;

    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/api/v1/workspaces/{id}/activity",
    responses((status = 200, body = Workspace))
)]
pub(crate) async fn report_activity(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Workspace>> {
    let workspace = state.orchestrator.record_activity(&id, &user.id).await?;

    Ok(Json(workspace))
}
