use crate::guard::DEFAULT_WORKSPACE_QUOTA;
use crate::WorkspaceOrchestrator;
use devspace_agent::{AgentClient, AgentConfig};
use sqlx::SqlitePool;

/// Helper to create an in-memory test database with migrations applied
pub async fn create_test_db() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Agent client with integration switched off; every call short-circuits
/// to a degraded-mode outcome.
pub fn disabled_agent() -> AgentClient {
    AgentClient::new(AgentConfig::default())
}

/// Orchestrator over an in-memory database with the agent disabled.
pub async fn create_test_orchestrator() -> WorkspaceOrchestrator {
    let pool = create_test_db().await;
    WorkspaceOrchestrator::new(pool, disabled_agent(), DEFAULT_WORKSPACE_QUOTA)
}
