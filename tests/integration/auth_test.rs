//! Authentication and authorization tests

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::{Duration, Utc};
use serde_json::json;

use church_admin::models::Role;

use crate::helpers::*;

#[tokio::test]
async fn test_login_returns_token_and_user() {
    let ctx = TestContext::new().await;

    let response = ctx
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "pastor@church.test", "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let body = response.json();
    assert_eq!(body["user"]["role"], "pastor");
    let token = body["token"].as_str().expect("token").to_string();

    let me = ctx.get("/api/auth/me", &token).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.json()["email"], "pastor@church.test");
    assert!(me.json().get("passwordHash").is_none());
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let ctx = TestContext::new().await;

    let response = ctx
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "pastor@church.test", "password": "not-the-password" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let ctx = TestContext::new().await;

    let response = ctx.request(Method::GET, "/api/members", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["message"], "Not authenticated");
}

#[tokio::test]
async fn test_expired_and_garbage_tokens_are_unauthorized() {
    let ctx = TestContext::new().await;

    let stale = ctx
        .auth
        .issue_token_at(&ctx.editor, Utc::now() - Duration::days(30))
        .expect("token");
    assert_eq!(ctx.get("/api/members", &stale).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(ctx.get("/api/members", "not.a.jwt").await.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_accepted_from_query_parameter() {
    let ctx = TestContext::new().await;
    let uri = format!("/api/members/export?token={}", ctx.admin_token());

    let response = ctx.request(Method::GET, &uri, None, None).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_editor_cannot_delete_or_export() {
    let ctx = TestContext::new().await;
    let member_id = ctx.create_member(fake_member()).await;
    let editor = ctx.token_for(Role::Editor);

    let response = ctx.delete(&format!("/api/members/{}", member_id), &editor).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(response.json()["message"].as_str().unwrap().contains("editor"));

    assert_eq!(ctx.get("/api/members/export", &editor).await.status, StatusCode::FORBIDDEN);
    assert_eq!(ctx.get("/api/donations/export", &editor).await.status, StatusCode::FORBIDDEN);

    // Editors may still write
    let update = ctx
        .put(&format!("/api/members/{}", member_id), &editor, json!({ "ministry": "Choir" }))
        .await;
    assert_eq!(update.status, StatusCode::OK);
}

#[tokio::test]
async fn test_pastor_can_delete() {
    let ctx = TestContext::new().await;
    let member_id = ctx.create_member(fake_member()).await;

    let response = ctx
        .delete(&format!("/api/members/{}", member_id), &ctx.token_for(Role::Pastor))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["message"], "Member deleted");
}

#[tokio::test]
async fn test_seed_admin_reports_existing_admin() {
    let ctx = TestContext::new().await;

    let response = ctx.request(Method::POST, "/api/auth/seed-admin", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["message"], "Admin already exists");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let ctx = TestContext::new().await;

    let response = ctx.request(Method::GET, "/api/nothing-here", None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["message"], "Not Found - /api/nothing-here");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let ctx = TestContext::new().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/members")
        .header(header::AUTHORIZATION, format!("Bearer {}", ctx.admin_token()))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"fullName\": "))
        .expect("request");

    let response = ctx.send(request).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["message"].is_string());
}

#[tokio::test]
async fn test_health_is_public() {
    let ctx = TestContext::new().await;

    let response = ctx.request(Method::GET, "/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
    assert!(body["uptime"].as_f64().is_some());
    assert!(response.header(header::HeaderName::from_static("x-request-id")).is_some());
}
