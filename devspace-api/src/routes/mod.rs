pub mod actions;
pub mod health;
pub mod workspaces;

use crate::{api_docs::ApiDoc, auth::auth_middleware, state::AppState};
use axum::{middleware, Router};
use devspace_agent::AgentClient;
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub async fn create_app(
    pool: SqlitePool,
    agent: AgentClient,
    workspace_quota: i64,
) -> anyhow::Result<Router> {
    let state = AppState::new(pool, agent, workspace_quota);

    // Allow CORS for local development (frontend on different port)
    let cors = CorsLayer::permissive();

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(health::routes()) // Health routes don't need auth
        .merge(
            workspaces::routes()
                .merge(actions::routes())
                .layer(middleware::from_fn(auth_middleware)), // Auth for workspaces and actions
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}
