use crate::{error::ApiResult, state::AppState};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use devspace_orchestrator::{ActionLogEntry, ActionLogFilters, ActionStatus, WorkspaceAction};
use serde::Deserialize;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/actions", get(list_actions))
        .route("/api/v1/actions/{id}", get(get_action))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActionsQuery {
    workspace_id: Option<String>,
    action: Option<String>,
    status: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/actions",
    responses((status = 200, body = [ActionLogEntry]))
)]
pub(crate) async fn list_actions(
    State(state): State<AppState>,
    Query(query): Query<ActionsQuery>,
) -> ApiResult<Json<Vec<ActionLogEntry>>> {
    // Parse action from string
    let action = query.action.and_then(|s| {
        serde_json::from_str::<WorkspaceAction>(&format!("\"{}\"", s.to_uppercase())).ok()
    });

    // Parse status from string
    let status = query.status.and_then(|s| {
        serde_json::from_str::<ActionStatus>(&format!("\"{}\"", s.to_uppercase())).ok()
    });

    let filters = ActionLogFilters {
        workspace_id: query.workspace_id,
        action,
        status,
    };

    let entries = state.orchestrator.list_actions(filters).await?;

    Ok(Json(entries))
}

#[utoipa::path(
    get,
    path = "/api/v1/actions/{id}",
    responses((status = 200, body = ActionLogEntry))
)]
pub(crate) async fn get_action(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ActionLogEntry>> {
    let entry = state.orchestrator.get_action(&id).await?;

    Ok(Json(entry))
}
