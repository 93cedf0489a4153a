//! Reporting endpoint tests

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::Value;

use crate::helpers::*;

fn find<'a>(items: &'a Value, field: &str, value: &str) -> &'a Value {
    items
        .as_array()
        .expect("array")
        .iter()
        .find(|item| item[field] == value)
        .unwrap_or_else(|| panic!("no item with {} = {}", field, value))
}

async fn seed_donations(ctx: &TestContext) {
    let token = ctx.admin_token();
    for (donor, amount, kind, date) in [
        ("Ruth", 100.0, "tithe", "2024-01-07"),
        ("Boaz", 50.0, "offering", "2024-01-14"),
        ("Ruth", 25.0, "tithe", "2024-02-04"),
    ] {
        let response = ctx.post("/api/donations", &token, donation_body(donor, amount, kind, date)).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
    }
}

#[tokio::test]
async fn test_donation_report_breakdowns() {
    let ctx = TestContext::new().await;
    seed_donations(&ctx).await;

    let report = ctx.get("/api/reports/donations", &ctx.admin_token()).await.json();
    assert_eq!(report["total"], 175.0);
    assert_eq!(find(&report["byType"], "type", "tithe")["total"], 125.0);
    assert_eq!(find(&report["byType"], "type", "offering")["total"], 50.0);

    let periods = report["totalByPeriod"].as_array().unwrap();
    assert_eq!(periods.len(), 2);
    assert_eq!(periods[0]["month"], 1);
    assert_eq!(periods[0]["total"], 150.0);
    assert_eq!(periods[1]["month"], 2);

    // Largest day first
    assert_eq!(report["byDate"][0]["date"], "2024-01-07");
}

#[tokio::test]
async fn test_donation_report_range_filter() {
    let ctx = TestContext::new().await;
    seed_donations(&ctx).await;
    let token = ctx.admin_token();

    let february = ctx
        .get("/api/reports/donations?from=2024-02-01&to=2024-02-29", &token)
        .await
        .json();
    assert_eq!(february["total"], 25.0);

    let empty = ctx
        .get("/api/reports/donations?from=2030-01-01&to=2030-12-31", &token)
        .await
        .json();
    assert_eq!(empty["total"], 0.0);
    assert!(empty["byType"].as_array().unwrap().is_empty());

    let inverted = ctx.get("/api/reports/donations?from=2024-03-01&to=2024-01-01", &token).await;
    assert_eq!(inverted.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_attendance_report_rates() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token();
    let youth = ctx.create_group("Youth").await;
    let alex = ctx.create_member(member_body("Alex", "male")).await;
    let sam = ctx.create_member(member_body("Sam", "female")).await;

    ctx.post(
        "/api/attendance",
        &token,
        attendance_body("2024-03-03", Some(youth), &[(alex, "present"), (sam, "absent")]),
    )
    .await;
    ctx.post(
        "/api/attendance",
        &token,
        attendance_body("2024-03-10", Some(youth), &[(alex, "present"), (sam, "present")]),
    )
    .await;

    let report = ctx.get("/api/reports/attendance", &token).await.json();
    let daily = report["daily"].as_array().unwrap();
    assert_eq!(daily.len(), 2);
    assert_eq!(daily[0]["key"], "2024-03-03");
    assert_eq!(daily[0]["rate"], 0.5);
    assert_eq!(daily[1]["rate"], 1.0);

    assert_eq!(report["byGroup"][0]["key"], youth);
    assert_eq!(report["byGroup"][0]["present"], 3);
    assert_eq!(report["byGroup"][0]["total"], 4);

    let ranged = ctx
        .get("/api/reports/attendance?from=2024-03-05&to=2024-03-31", &token)
        .await
        .json();
    assert_eq!(ranged["daily"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_member_report_lists_every_age_bucket() {
    let ctx = TestContext::new().await;
    ctx.create_member(member_with("Elder", "male", Some("1970-01-01"), Some("Deacons"))).await;
    ctx.create_member(member_with("Unknown Age", "female", None, None)).await;

    let report = ctx.get("/api/reports/members", &ctx.admin_token()).await.json();
    let buckets = report["ageGroups"]["buckets"].as_array().unwrap();
    assert_eq!(buckets.len(), 5);
    let total: u64 = buckets.iter().map(|b| b["count"].as_u64().unwrap()).sum();
    assert_eq!(total, 1);
    assert_eq!(report["ageGroups"]["unknown"], 1);

    let genders = report["genders"].as_array().unwrap();
    assert_eq!(genders.len(), 2);
    let this_month = &report["membersByMonth"][0];
    assert_eq!(this_month["count"], 2);
}

#[tokio::test]
async fn test_dashboard_summary() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token();
    seed_donations(&ctx).await;
    ctx.create_member(member_body("Alex", "male")).await;
    ctx.create_group("Youth").await;

    let tomorrow = (Utc::now() + Duration::days(1)).to_rfc3339();
    let last_year = (Utc::now() - Duration::days(365)).to_rfc3339();
    ctx.post("/api/events", &token, event_body("Picnic", &tomorrow)).await;
    ctx.post("/api/events", &token, event_body("Old Retreat", &last_year)).await;

    let dashboard = ctx.get("/api/reports/dashboard", &token).await.json();
    assert_eq!(dashboard["totalMembers"], 1);
    assert_eq!(dashboard["totalGroups"], 1);
    assert_eq!(dashboard["totalDonations"], 175.0);
    let upcoming = dashboard["upcomingEvents"].as_array().unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0]["title"], "Picnic");

    let events = ctx.get("/api/reports/events", &token).await.json();
    assert_eq!(events["upcoming"], 1);
    assert_eq!(events["past"], 1);
}

#[tokio::test]
async fn test_group_report_sizes() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token();
    let youth = ctx.create_group("Youth").await;
    ctx.create_group("Choir").await;
    let alex = ctx.create_member(member_body("Alex", "male")).await;
    ctx.post(&format!("/api/groups/{}/assign", youth), &token, serde_json::json!({ "memberId": alex }))
        .await;

    let report = ctx.get("/api/reports/groups", &token).await.json();
    assert_eq!(find(&report["groupSizes"], "name", "Youth")["size"], 1);
    assert_eq!(find(&report["groupSizes"], "name", "Choir")["size"], 0);
}
