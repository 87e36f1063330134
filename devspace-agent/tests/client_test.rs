//! Integration tests for the agent client
//!
//! Each test spins up a stub agent on an ephemeral port and checks how the
//! client normalizes the agent's success and failure envelopes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use devspace_agent::{
    AgentClient, AgentConfig, AgentError, AgentHealth, DeleteEnvironmentRequest,
    StartEnvironmentRequest, StopEnvironmentRequest,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Bind a stub agent on an ephemeral port and return its base URL.
async fn spawn_stub_agent(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub agent");
    let addr = listener.local_addr().expect("Failed to read local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Stub agent failed");
    });

    format!("http://{}", addr)
}

fn test_config(base_url: String) -> AgentConfig {
    AgentConfig {
        base_url,
        enabled: true,
        health_timeout: Duration::from_secs(2),
        action_timeout: Duration::from_secs(2),
        create_timeout: Duration::from_secs(2),
    }
}

fn start_request() -> StartEnvironmentRequest {
    StartEnvironmentRequest {
        workspace_id: "ws-1".to_string(),
        cloud_region: "eastus".to_string(),
        user_id: "user-1".to_string(),
        name: "my-workspace".to_string(),
        cpu_cores: 2,
        memory_gb: 4,
        storage_gb: 50,
        base_image: "node".to_string(),
    }
}

#[tokio::test]
async fn test_health_probe_accepts_200() {
    let app = Router::new().route("/health", get(|| async { Json(json!({"status": "ok"})) }));
    let base_url = spawn_stub_agent(app).await;

    let client = AgentClient::new(test_config(base_url));
    assert_eq!(client.probe_health().await, AgentHealth::Available);
}

#[tokio::test]
async fn test_health_probe_accepts_503_as_degraded() {
    let app = Router::new().route(
        "/health",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"status": "degraded"}))) }),
    );
    let base_url = spawn_stub_agent(app).await;

    let client = AgentClient::new(test_config(base_url));
    assert_eq!(client.probe_health().await, AgentHealth::Available);
}

#[tokio::test]
async fn test_health_probe_rejects_other_statuses() {
    let app = Router::new().route(
        "/health",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let base_url = spawn_stub_agent(app).await;

    let client = AgentClient::new(test_config(base_url));
    assert_eq!(client.probe_health().await, AgentHealth::Unavailable);
}

#[tokio::test]
async fn test_health_probe_unreachable_agent() {
    // Nothing is listening on this port
    let client = AgentClient::new(test_config("http://127.0.0.1:1".to_string()));
    assert_eq!(client.probe_health().await, AgentHealth::Unavailable);
}

#[tokio::test]
async fn test_disabled_client_short_circuits() {
    let config = AgentConfig {
        enabled: false,
        ..test_config("http://127.0.0.1:1".to_string())
    };
    let client = AgentClient::new(config);

    assert_eq!(client.probe_health().await, AgentHealth::Unavailable);

    let err = client
        .start_environment(&start_request())
        .await
        .expect_err("Disabled client should not succeed");
    assert!(matches!(err, AgentError::Disabled));
}

#[tokio::test]
async fn test_start_returns_environment_payload() {
    let app = Router::new().route(
        "/api/v1/environments/start",
        post(|| async {
            Json(json!({
                "success": true,
                "message": "started",
                "data": {
                    "environment": {
                        "id": "ws-1",
                        "status": "RUNNING",
                        "connectionUrls": {
                            "webUrl": "https://ws-1.example.dev",
                            "sshUrl": "ssh://dev@ws-1.example.dev"
                        }
                    }
                }
            }))
        }),
    );
    let base_url = spawn_stub_agent(app).await;

    let client = AgentClient::new(test_config(base_url));
    let env = client
        .start_environment(&start_request())
        .await
        .expect("Start should succeed");

    assert_eq!(env.id, "ws-1");
    let urls = env.connection_urls.expect("Expected connection URLs");
    assert_eq!(urls.web_url.as_deref(), Some("https://ws-1.example.dev"));
    assert_eq!(urls.ssh_url.as_deref(), Some("ssh://dev@ws-1.example.dev"));
}

#[tokio::test]
async fn test_success_false_normalized_to_call_failed() {
    let app = Router::new().route(
        "/api/v1/environments/start",
        post(|| async {
            Json(json!({
                "success": false,
                "message": "quota exhausted in region",
                "code": "REGION_QUOTA"
            }))
        }),
    );
    let base_url = spawn_stub_agent(app).await;

    let client = AgentClient::new(test_config(base_url));
    let err = client
        .start_environment(&start_request())
        .await
        .expect_err("success=false must fail");

    match err {
        AgentError::CallFailed { reason } => assert!(reason.contains("quota exhausted")),
        other => panic!("Expected CallFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_2xx_normalized_to_call_failed() {
    let app = Router::new().route(
        "/api/v1/environments/stop",
        post(|| async {
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({"success": false, "error": "upstream exploded"})),
            )
        }),
    );
    let base_url = spawn_stub_agent(app).await;

    let client = AgentClient::new(test_config(base_url));
    let err = client
        .stop_environment(&StopEnvironmentRequest {
            workspace_id: "ws-1".to_string(),
            cloud_region: "eastus".to_string(),
        })
        .await
        .expect_err("502 must fail");

    match err {
        AgentError::CallFailed { reason } => assert!(reason.contains("upstream exploded")),
        other => panic!("Expected CallFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_normalized_to_call_failed() {
    let app = Router::new().route(
        "/api/v1/environments/start",
        post(|| async { "<html>definitely not json</html>" }),
    );
    let base_url = spawn_stub_agent(app).await;

    let client = AgentClient::new(test_config(base_url));
    let err = client
        .start_environment(&start_request())
        .await
        .expect_err("Malformed body must fail");

    assert!(matches!(err, AgentError::CallFailed { .. }));
}

#[tokio::test]
async fn test_missing_environment_payload_is_call_failed() {
    let app = Router::new().route(
        "/api/v1/environments/start",
        post(|| async { Json(json!({"success": true, "message": "ok"})) }),
    );
    let base_url = spawn_stub_agent(app).await;

    let client = AgentClient::new(test_config(base_url));
    let err = client
        .start_environment(&start_request())
        .await
        .expect_err("Empty payload must fail");

    match err {
        AgentError::CallFailed { reason } => assert!(reason.contains("empty environment")),
        other => panic!("Expected CallFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_slow_agent_times_out() {
    let app = Router::new().route(
        "/api/v1/environments/stop",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"success": true, "message": "ok"}))
        }),
    );
    let base_url = spawn_stub_agent(app).await;

    let config = AgentConfig {
        action_timeout: Duration::from_millis(200),
        ..test_config(base_url)
    };
    let client = AgentClient::new(config);

    let err = client
        .stop_environment(&StopEnvironmentRequest {
            workspace_id: "ws-1".to_string(),
            cloud_region: "eastus".to_string(),
        })
        .await
        .expect_err("Slow agent must time out");

    assert!(matches!(err, AgentError::Timeout { .. }));
}

#[tokio::test]
async fn test_delete_carries_force_flag() {
    let captured: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));

    let app = Router::new()
        .route(
            "/api/v1/environments",
            delete(
                |State(captured): State<Arc<Mutex<Option<Value>>>>, Json(body): Json<Value>| async move {
                    *captured.lock().unwrap() = Some(body);
                    Json(json!({"success": true, "message": "deleted"}))
                },
            ),
        )
        .with_state(captured.clone());
    let base_url = spawn_stub_agent(app).await;

    let client = AgentClient::new(test_config(base_url));
    client
        .delete_environment(&DeleteEnvironmentRequest {
            workspace_id: "ws-1".to_string(),
            cloud_region: "eastus".to_string(),
            force: true,
        })
        .await
        .expect("Delete should succeed");

    let body = captured.lock().unwrap().take().expect("Body not captured");
    assert_eq!(body["workspaceId"], "ws-1");
    assert_eq!(body["force"], true);
}

#[tokio::test]
async fn test_report_activity() {
    let app = Router::new().route(
        "/api/v1/environments/{id}/activity",
        post(|| async { Json(json!({"success": true, "message": "recorded"})) }),
    );
    let base_url = spawn_stub_agent(app).await;

    let client = AgentClient::new(test_config(base_url));
    client
        .report_activity("ws-1")
        .await
        .expect("Activity report should succeed");
}
