//! A week in the life of the church office, end to end

use axum::http::StatusCode;
use serde_json::json;

use church_admin::models::Role;

use crate::helpers::*;

#[tokio::test]
async fn test_member_group_attendance_journey() {
    let ctx = TestContext::new().await;
    let editor = ctx.token_for(Role::Editor);
    let pastor = ctx.token_for(Role::Pastor);

    // The editor registers Alex and starts a Youth group
    let created = ctx
        .post("/api/members", &editor, member_with("Alex", "male", Some("2008-09-01"), Some("Youth")))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let alex = created.json()["id"].as_i64().unwrap();

    let youth = ctx
        .post("/api/groups", &editor, json!({ "name": "Youth", "leaderId": alex }))
        .await
        .json()["id"]
        .as_i64()
        .unwrap();

    let assigned = ctx
        .post(&format!("/api/groups/{}/assign", youth), &editor, json!({ "memberId": alex }))
        .await
        .json();
    assert_eq!(assigned["members"][0]["fullName"], "Alex");
    assert_eq!(assigned["leader"]["id"], alex);

    let groups = ctx.get("/api/groups", &editor).await.json();
    assert_eq!(groups[0]["name"], "Youth");
    assert_eq!(groups[0]["members"][0]["id"], alex);

    // Sunday attendance, then a correction
    ctx.post("/api/attendance", &editor, attendance_body("2024-03-03", Some(youth), &[(alex, "absent")]))
        .await;
    ctx.post("/api/attendance", &editor, attendance_body("2024-03-03", Some(youth), &[(alex, "present")]))
        .await;

    let report = ctx.get("/api/reports/attendance", &editor).await.json();
    assert_eq!(report["byMember"][0]["key"], alex);
    assert_eq!(report["byMember"][0]["total"], 1);
    assert_eq!(report["byMember"][0]["rate"], 1.0);

    // Editors cannot delete groups; the pastor can
    let refused = ctx.delete(&format!("/api/groups/{}", youth), &editor).await;
    assert_eq!(refused.status, StatusCode::FORBIDDEN);

    let deleted = ctx.delete(&format!("/api/groups/{}", youth), &pastor).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.json()["unassigned"], 1);

    let alex_view = ctx.get(&format!("/api/members/{}", alex), &editor).await.json();
    assert!(alex_view["smallGroup"].is_null());

    // History survives the group
    let history = ctx.get(&format!("/api/attendance/member/{}", alex), &editor).await.json();
    assert_eq!(history[0]["status"], "present");
    assert_eq!(history[0]["smallGroupId"], youth);

    let groups = ctx.get("/api/reports/groups", &editor).await.json();
    assert!(groups["groupSizes"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_donation_and_event_lifecycle() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token();

    let donation = ctx
        .post("/api/donations", &token, donation_body("Lydia", 80.0, "offering", "2024-04-07"))
        .await
        .json();
    let donation_id = donation["id"].as_i64().unwrap();

    let rejected = ctx
        .post("/api/donations", &token, donation_body("Lydia", -5.0, "offering", "2024-04-07"))
        .await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);

    let updated = ctx
        .put(&format!("/api/donations/{}", donation_id), &token, json!({ "amount": 90.0 }))
        .await
        .json();
    assert_eq!(updated["amount"], 90.0);
    assert_eq!(updated["type"], "offering");

    let tithes = ctx.get("/api/donations?type=tithe", &token).await.json();
    assert!(tithes.as_array().unwrap().is_empty());

    let removed = ctx.delete(&format!("/api/donations/{}", donation_id), &token).await;
    assert_eq!(removed.json()["message"], "Donation deleted");
    assert!(ctx.get("/api/donations", &token).await.json().as_array().unwrap().is_empty());

    let event = ctx
        .post("/api/events", &token, json!({ "title": "Baptism", "date": "2099-06-01", "attendees": [1, 1, 2] }))
        .await;
    assert_eq!(event.status, StatusCode::CREATED);
    let event = event.json();
    assert_eq!(event["attendees"], json!([1, 2]));

    let upcoming = ctx.get("/api/events?upcoming=true", &token).await.json();
    assert_eq!(upcoming.as_array().unwrap().len(), 1);

    let event_id = event["id"].as_i64().unwrap();
    let moved = ctx
        .put(&format!("/api/events/{}", event_id), &token, json!({ "date": "2001-01-01" }))
        .await;
    assert_eq!(moved.status, StatusCode::OK);
    let upcoming = ctx.get("/api/events?upcoming=true", &token).await.json();
    assert!(upcoming.as_array().unwrap().is_empty());

    assert_eq!(
        ctx.delete(&format!("/api/events/{}", event_id), &token).await.json()["message"],
        "Event deleted"
    );
    assert_eq!(
        ctx.delete(&format!("/api/events/{}", event_id), &token).await.status,
        StatusCode::NOT_FOUND
    );
}
