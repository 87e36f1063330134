use devspace_agent::AgentClient;
use devspace_orchestrator::WorkspaceOrchestrator;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: WorkspaceOrchestrator,
}

impl AppState {
    pub fn new(pool: SqlitePool, agent: AgentClient, workspace_quota: i64) -> Self {
        Self {
            orchestrator: WorkspaceOrchestrator::new(pool, agent, workspace_quota),
        }
    }
}
