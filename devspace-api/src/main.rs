use anyhow::Result;
use devspace_agent::{AgentClient, AgentConfig};
use devspace_api::{create_app, Config};
use devspace_orchestrator::db::{backup_database, create_pool, run_migrations};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter("devspace_api=debug,devspace_orchestrator=debug,devspace_agent=debug,tower_http=debug")
        .init();

    info!("Starting devspace-api service...");

    // Load configuration
    let config = Config::from_env();
    info!(
        "Configuration loaded: bind_addr={}, db_path={}, quota={}",
        config.bind_addr,
        config.db_path.display(),
        config.workspace_quota
    );

    let agent_config = AgentConfig::from_env();
    info!(
        "Agent integration: enabled={}, base_url={}",
        agent_config.enabled, agent_config.base_url
    );
    let agent = AgentClient::new(agent_config);

    // Database setup
    let db_path = &config.db_path;

    // Backup before migrations
    if db_path.exists() {
        let backup_path = backup_database(db_path)?;
        info!("Database backed up to: {}", backup_path.display());
    }

    // Create pool and run migrations
    let pool = create_pool(db_path).await?;
    info!("Running database migrations...");
    run_migrations(&pool).await?;
    info!("Migrations complete");

    // Create app
    let app = create_app(pool, agent, config.workspace_quota).await?;

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
