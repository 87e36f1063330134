//! Tests for the identity middleware
//!
//! The service trusts whatever identity header the fronting proxy set,
//! in precedence order: x-devspace-user, x-forwarded-user, x-user.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use devspace_orchestrator::Workspace;
use tower::ServiceExt; // for `oneshot`

#[tokio::test]
async fn test_missing_identity_is_unauthorized() {
    let pool = common::create_test_db().await;
    let app = common::create_test_app(pool).await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/workspaces")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_blank_identity_is_unauthorized() {
    let pool = common::create_test_db().await;
    let app = common::create_test_app(pool).await;

    for value in ["", "   "] {
        let request = Request::builder()
            .method("GET")
            .uri("/api/v1/workspaces")
            .header("x-user", value)
            .body(Body::empty())
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_proxy_header_takes_precedence() {
    let pool = common::create_test_db().await;
    common::fixture_workspaces_for_user(&pool, "proxy-user", 1).await;
    common::fixture_workspaces_for_user(&pool, "dev-user", 2).await;
    let app = common::create_test_app(pool).await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/workspaces")
        .header("x-devspace-user", "proxy-user")
        .header("x-user", "dev-user")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let workspaces: Vec<Workspace> = common::extract_json_body(response).await;
    assert_eq!(workspaces.len(), 1);
    assert_eq!(workspaces[0].owner_id, "proxy-user");
}

#[tokio::test]
async fn test_forwarded_user_header_accepted() {
    let pool = common::create_test_db().await;
    common::fixture_workspaces_for_user(&pool, "carol", 2).await;
    let app = common::create_test_app(pool).await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/workspaces")
        .header("x-forwarded-user", "carol")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let workspaces: Vec<Workspace> = common::extract_json_body(response).await;
    assert_eq!(workspaces.len(), 2);
}
