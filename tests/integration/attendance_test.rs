//! Attendance ledger tests

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::*;

#[tokio::test]
async fn test_marking_twice_overwrites_status() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token();
    let member = ctx.create_member(member_body("Alex", "male")).await;
    let youth = ctx.create_group("Youth").await;

    let first = ctx
        .post("/api/attendance", &token, attendance_body("2024-03-03", Some(youth), &[(member, "present")]))
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.json()["message"], "Attendance saved");

    ctx.post("/api/attendance", &token, attendance_body("2024-03-03", Some(youth), &[(member, "absent")]))
        .await;

    let records = ctx
        .get(&format!("/api/attendance?date=2024-03-03&smallGroup={}", youth), &token)
        .await
        .json();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["status"], "absent");
    assert_eq!(records[0]["member"]["fullName"], "Alex");
    assert_eq!(records[0]["smallGroup"]["name"], "Youth");
}

#[tokio::test]
async fn test_group_and_no_group_marks_are_distinct() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token();
    let member = ctx.create_member(member_body("Alex", "male")).await;
    let youth = ctx.create_group("Youth").await;

    ctx.post("/api/attendance", &token, attendance_body("2024-03-03", None, &[(member, "present")]))
        .await;
    ctx.post("/api/attendance", &token, attendance_body("2024-03-03", Some(youth), &[(member, "present")]))
        .await;

    let all = ctx.get("/api/attendance?date=2024-03-03", &token).await.json();
    assert_eq!(all.as_array().unwrap().len(), 2);

    let history = ctx.get(&format!("/api/attendance/member/{}", member), &token).await.json();
    assert_eq!(history.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_status_defaults_to_present() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token();
    let member = ctx.create_member(member_body("Alex", "male")).await;

    ctx.post(
        "/api/attendance",
        &token,
        json!({ "date": "2024-03-10", "records": [{ "member": member }] }),
    )
    .await;

    let records = ctx.get("/api/attendance?date=2024-03-10", &token).await.json();
    assert_eq!(records[0]["status"], "present");
}

#[tokio::test]
async fn test_empty_batch() {
    let ctx = TestContext::new().await;

    let response = ctx
        .post("/api/attendance", &ctx.admin_token(), attendance_body("2024-03-03", None, &[]))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["message"], "No records");
}

#[tokio::test]
async fn test_unknown_member_or_group_is_not_found() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token();
    let member = ctx.create_member(member_body("Alex", "male")).await;

    let bad_member = ctx
        .post("/api/attendance", &token, attendance_body("2024-03-03", None, &[(4040, "present")]))
        .await;
    assert_eq!(bad_member.status, StatusCode::NOT_FOUND);

    let bad_group = ctx
        .post("/api/attendance", &token, attendance_body("2024-03-03", Some(4040), &[(member, "present")]))
        .await;
    assert_eq!(bad_group.status, StatusCode::NOT_FOUND);
    assert_eq!(bad_group.json()["message"], "Group not found");
}

#[tokio::test]
async fn test_invalid_date_and_status_are_bad_requests() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token();
    let member = ctx.create_member(member_body("Alex", "male")).await;

    let bad_date = ctx
        .post("/api/attendance", &token, attendance_body("03/03/2024", None, &[(member, "present")]))
        .await;
    assert_eq!(bad_date.status, StatusCode::BAD_REQUEST);

    let bad_status = ctx
        .post("/api/attendance", &token, attendance_body("2024-03-03", None, &[(member, "late")]))
        .await;
    assert_eq!(bad_status.status, StatusCode::BAD_REQUEST);

    let missing_date = ctx.get("/api/attendance", &token).await;
    assert_eq!(missing_date.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing_date.json()["message"], "date is required");
}

#[tokio::test]
async fn test_member_history_date_range() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token();
    let member = ctx.create_member(member_body("Alex", "male")).await;

    for date in ["2024-03-17", "2024-03-03", "2024-03-10"] {
        ctx.post("/api/attendance", &token, attendance_body(date, None, &[(member, "present")]))
            .await;
    }

    let history = ctx
        .get(&format!("/api/attendance/member/{}?from=2024-03-05&to=2024-03-31", member), &token)
        .await
        .json();
    let dates: Vec<&str> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-03-10", "2024-03-17"]);

    let inverted = ctx
        .get(&format!("/api/attendance/member/{}?from=2024-04-01&to=2024-03-01", member), &token)
        .await;
    assert_eq!(inverted.status, StatusCode::BAD_REQUEST);
}
