//! CSV export and import tests

use axum::http::{header, StatusCode};
use serde_json::json;

use crate::helpers::*;

fn parse(body: &str) -> Vec<Vec<String>> {
    csv::Reader::from_reader(body.as_bytes())
        .records()
        .map(|r| r.expect("csv record").iter().map(str::to_string).collect())
        .collect()
}

#[tokio::test]
async fn test_member_export_headers_and_quoting() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token();
    let youth = ctx.create_group("Youth").await;
    let id = ctx
        .create_member(json!({
            "fullName": "Smith, J.",
            "gender": "male",
            "address": "12 \"Old\" Road",
        }))
        .await;
    ctx.post(&format!("/api/groups/{}/assign", youth), &token, json!({ "memberId": id }))
        .await;

    let response = ctx.get("/api/members/export", &token).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header(header::CONTENT_TYPE), Some("text/csv"));
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        Some("attachment; filename=\"members.csv\"")
    );

    let body = response.text();
    assert!(body.starts_with("Full Name,Gender,Phone,Address,Ministry,Small Group,Profile Photo URL,Created At"));
    assert!(body.contains("\"Smith, J.\""));

    let rows = parse(&body);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], "Smith, J.");
    assert_eq!(rows[0][3], "12 \"Old\" Road");
    assert_eq!(rows[0][5], "Youth");
}

#[tokio::test]
async fn test_donation_export() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token();
    ctx.post("/api/donations", &token, donation_body("Ruth", 42.5, "special", "2024-05-05"))
        .await;

    let response = ctx.get("/api/donations/export", &token).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        Some("attachment; filename=\"donations.csv\"")
    );

    let body = response.text();
    assert!(body.starts_with("Donor Name,Amount,Type,Date"));
    let rows = parse(&body);
    assert_eq!(rows[0][0], "Ruth");
    assert_eq!(rows[0][1].parse::<f64>().unwrap(), 42.5);
    assert_eq!(rows[0][2], "special");
    assert_eq!(rows[0][3], "2024-05-05");
}

#[tokio::test]
async fn test_exported_csv_imports_back() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token();
    ctx.create_member(member_with("Smith, J.", "male", None, Some("Ushers"))).await;
    ctx.create_member(fake_member()).await;

    let exported = ctx.get("/api/members/export", &token).await.text();
    let response = ctx.post("/api/members/import", &token, json!({ "csv": exported })).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text());
    assert_eq!(response.json()["inserted"], 2);

    let page = ctx.get("/api/members?search=smith%2C%20j", &token).await.json();
    assert_eq!(page["total"], 2);
    assert_eq!(page["items"][0]["ministry"], "Ushers");
}
