//! Common test utilities and helpers for devspace-api tests

#![allow(dead_code)]

use axum::body::Body;
use axum::http::Response;
use axum::Router;
use devspace_orchestrator::guard::DEFAULT_WORKSPACE_QUOTA;
use devspace_orchestrator::test_utils::disabled_agent;
use devspace_orchestrator::{CreateWorkspaceRequest, WorkspaceOrchestrator};
use serde::de::DeserializeOwned;
use sqlx::SqlitePool;

/// Helper to create an in-memory test database with migrations
pub async fn create_test_db() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    // Run migrations from devspace-orchestrator
    sqlx::migrate!("../devspace-orchestrator/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Create a test app with the given database pool. The agent is disabled,
/// so every lifecycle action takes the degraded local path.
pub async fn create_test_app(pool: SqlitePool) -> Router {
    devspace_api::create_app(pool, disabled_agent(), DEFAULT_WORKSPACE_QUOTA)
        .await
        .expect("Failed to create test app")
}

/// Create a test workspace request with default values
pub fn create_test_workspace_request(name: &str) -> CreateWorkspaceRequest {
    CreateWorkspaceRequest {
        name: name.to_string(),
        region: "eastus".to_string(),
        cpu_cores: 2,
        memory_gb: 4,
        storage_gb: 50,
        base_image: "node".to_string(),
    }
}

/// Seed `count` workspaces for `owner` directly through the orchestrator.
pub async fn fixture_workspaces_for_user(pool: &SqlitePool, owner: &str, count: usize) {
    let orchestrator =
        WorkspaceOrchestrator::new(pool.clone(), disabled_agent(), DEFAULT_WORKSPACE_QUOTA);

    for i in 0..count {
        orchestrator
            .create_workspace(owner, create_test_workspace_request(&format!("ws-{}", i)))
            .await
            .expect("Failed to seed workspace");
    }
}

/// Deserialize a response body into the given type
pub async fn extract_json_body<T: DeserializeOwned>(response: Response<Body>) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");

    serde_json::from_slice(&bytes).expect("Failed to deserialize response body")
}
