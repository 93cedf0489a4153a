//! Member endpoint tests

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::*;

#[tokio::test]
async fn test_create_and_get_member() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token();

    let id = ctx
        .create_member(member_with("Grace Hopper", "female", Some("1980-01-01"), Some("Choir")))
        .await;

    let response = ctx.get(&format!("/api/members/{}", id), &token).await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["fullName"], "Grace Hopper");
    assert_eq!(body["ministry"], "Choir");
    assert!(body["smallGroup"].is_null());
    assert!(body["age"].as_u64().unwrap() >= 45);
}

#[tokio::test]
async fn test_create_requires_full_name() {
    let ctx = TestContext::new().await;

    let response = ctx
        .post("/api/members", &ctx.admin_token(), member_body("   ", "male"))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["message"], "fullName is required");
}

#[tokio::test]
async fn test_unknown_member_is_not_found() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/api/members/9999", &ctx.admin_token()).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["message"], "Member not found");
}

#[tokio::test]
async fn test_list_filters_and_paginates() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token();

    for i in 0..25 {
        ctx.create_member(member_body(&format!("Member {:02}", i), "female")).await;
    }
    ctx.create_member(member_with("Zed Usher", "male", None, Some("Ushers"))).await;

    let first = ctx.get("/api/members?page=1&limit=10", &token).await.json();
    assert_eq!(first["total"], 26);
    assert_eq!(first["pages"], 3);
    assert_eq!(first["items"].as_array().unwrap().len(), 10);
    // Newest first
    assert_eq!(first["items"][0]["fullName"], "Zed Usher");

    let by_gender = ctx.get("/api/members?gender=male", &token).await.json();
    assert_eq!(by_gender["total"], 1);

    let by_ministry = ctx.get("/api/members?ministry=Ushers", &token).await.json();
    assert_eq!(by_ministry["items"][0]["fullName"], "Zed Usher");

    let by_search = ctx.get("/api/members?search=member%2007", &token).await.json();
    assert_eq!(by_search["total"], 1);
    assert_eq!(by_search["items"][0]["fullName"], "Member 07");
}

#[tokio::test]
async fn test_update_keeps_group_and_unset_fields() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token();
    let member_id = ctx.create_member(member_with("Alex", "male", None, Some("Youth"))).await;
    let group_id = ctx.create_group("Youth").await;
    ctx.post(&format!("/api/groups/{}/assign", group_id), &token, json!({ "memberId": member_id }))
        .await;

    let response = ctx
        .put(&format!("/api/members/{}", member_id), &token, json!({ "phone": "555-0100" }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["phone"], "555-0100");
    assert_eq!(body["ministry"], "Youth");
    assert_eq!(body["smallGroup"]["id"], group_id);
}

#[tokio::test]
async fn test_update_clears_ministry_and_birth_date() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token();
    let member_id = ctx
        .create_member(member_with("Grace", "female", Some("1980-01-01"), Some("Choir")))
        .await;

    let blanked = ctx
        .put(&format!("/api/members/{}", member_id), &token, json!({ "ministry": "   ", "address": " 1 Main St " }))
        .await;
    assert_eq!(blanked.status, StatusCode::OK);
    let body = blanked.json();
    assert!(body["ministry"].is_null());
    assert_eq!(body["address"], "1 Main St");

    let report = ctx.get("/api/reports/members", &token).await.json();
    assert_eq!(report["byMinistry"], json!([{ "value": null, "count": 1 }]));

    let cleared = ctx
        .put(&format!("/api/members/{}", member_id), &token, json!({ "dateOfBirth": null }))
        .await
        .json();
    assert!(cleared["dateOfBirth"].is_null());
    assert!(cleared["age"].is_null());
    assert_eq!(cleared["address"], "1 Main St");
}

#[tokio::test]
async fn test_list_with_huge_page_is_empty() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token();
    ctx.create_member(member_body("Ada", "female")).await;

    let response = ctx
        .get("/api/members?page=9223372036854775807&limit=100", &token)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["total"], 1);
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_member_cleans_group_and_attendance() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token();
    let member_id = ctx.create_member(member_body("Alex", "male")).await;
    let group_id = ctx.create_group("Youth").await;
    ctx.post(&format!("/api/groups/{}/assign", group_id), &token, json!({ "memberId": member_id }))
        .await;
    ctx.post("/api/attendance", &token, attendance_body("2024-03-03", None, &[(member_id, "present")]))
        .await;

    let response = ctx.delete(&format!("/api/members/{}", member_id), &token).await;
    assert_eq!(response.status, StatusCode::OK);

    let group = ctx.get(&format!("/api/groups/{}", group_id), &token).await.json();
    assert!(group["members"].as_array().unwrap().is_empty());
    let records = ctx.get("/api/attendance?date=2024-03-03", &token).await.json();
    assert!(records.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_import_rows_inserts_all() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token();

    let response = ctx
        .post(
            "/api/members/import",
            &token,
            json!({ "rows": [
                { "Full Name": "Ruth", "Gender": "female", "Ministry": "Choir" },
                { "fullName": "Boaz", "gender": "Male", "dateOfBirth": "1970-05-01" }
            ] }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text());
    assert_eq!(response.json()["inserted"], 2);

    let page = ctx.get("/api/members", &token).await.json();
    assert_eq!(page["total"], 2);
}

#[tokio::test]
async fn test_import_bad_row_inserts_nothing() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token();

    let response = ctx
        .post(
            "/api/members/import",
            &token,
            json!({ "rows": [
                { "fullName": "Ruth", "gender": "female" },
                { "fullName": "", "gender": "male" }
            ] }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["message"], "Row 2: fullName is required");

    let page = ctx.get("/api/members", &token).await.json();
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn test_import_requires_rows() {
    let ctx = TestContext::new().await;

    let response = ctx.post("/api/members/import", &ctx.admin_token(), json!({})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
