//! Small group and membership consistency tests

use axum::http::StatusCode;
use serde_json::{json, Value};

use church_admin::models::Role;

use crate::helpers::*;

fn member_ids(group: &Value) -> Vec<i64> {
    group["members"]
        .as_array()
        .expect("members array")
        .iter()
        .map(|m| m["id"].as_i64().expect("member id"))
        .collect()
}

#[tokio::test]
async fn test_group_crud() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token();
    let leader = ctx.create_member(member_body("Lydia", "female")).await;

    let created = ctx
        .post(
            "/api/groups",
            &token,
            json!({ "name": "Home Group", "leaderId": leader, "meetingDay": "Wednesday", "meetingTime": "19:00" }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let group = created.json();
    assert_eq!(group["leader"]["fullName"], "Lydia");
    let id = group["id"].as_i64().unwrap();

    let updated = ctx
        .put(&format!("/api/groups/{}", id), &token, json!({ "location": "Room 4" }))
        .await
        .json();
    assert_eq!(updated["location"], "Room 4");
    assert_eq!(updated["meetingDay"], "Wednesday");

    let searched = ctx.get("/api/groups?search=home", &token).await.json();
    assert_eq!(searched.as_array().unwrap().len(), 1);

    let deleted = ctx.delete(&format!("/api/groups/{}", id), &token).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.json()["message"], "Group deleted and members unassigned");
    assert_eq!(ctx.get(&format!("/api/groups/{}", id), &token).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_group_clears_leader() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token();
    let leader = ctx.create_member(member_body("Lydia", "female")).await;
    let id = ctx
        .post("/api/groups", &token, json!({ "name": "Home Group", "leaderId": leader, "notes": "Bring snacks" }))
        .await
        .json()["id"]
        .as_i64()
        .unwrap();

    let updated = ctx
        .put(&format!("/api/groups/{}", id), &token, json!({ "leader": null, "notes": "" }))
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    let body = updated.json();
    assert!(body["leader"].is_null());
    assert!(body["notes"].is_null());
    assert_eq!(body["name"], "Home Group");
}

#[tokio::test]
async fn test_create_group_requires_name() {
    let ctx = TestContext::new().await;

    let response = ctx.post("/api/groups", &ctx.admin_token(), json!({ "name": "" })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_groups_listed_by_name() {
    let ctx = TestContext::new().await;
    for name in ["Youth", "Choir", "Men"] {
        ctx.create_group(name).await;
    }

    let groups = ctx.get("/api/groups", &ctx.admin_token()).await.json();
    let names: Vec<&str> = groups
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Choir", "Men", "Youth"]);
}

#[tokio::test]
async fn test_assign_moves_member_between_groups() {
    let ctx = TestContext::new().await;
    let token = ctx.token_for(Role::Editor);
    let member = ctx.create_member(member_body("Alex", "male")).await;
    let youth = ctx.create_group("Youth").await;
    let choir = ctx.create_group("Choir").await;

    let first = ctx
        .post(&format!("/api/groups/{}/assign", youth), &token, json!({ "memberId": member }))
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(member_ids(&first.json()), vec![member]);

    let second = ctx
        .post(&format!("/api/groups/{}/assign", choir), &token, json!({ "memberId": member }))
        .await
        .json();
    assert_eq!(member_ids(&second), vec![member]);

    let youth_view = ctx.get(&format!("/api/groups/{}", youth), &token).await.json();
    assert!(member_ids(&youth_view).is_empty());

    let member_view = ctx.get(&format!("/api/members/{}", member), &token).await.json();
    assert_eq!(member_view["smallGroup"]["id"], choir);
    assert_eq!(member_view["smallGroup"]["name"], "Choir");
}

#[tokio::test]
async fn test_assign_twice_keeps_one_entry() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token();
    let member = ctx.create_member(member_body("Alex", "male")).await;
    let youth = ctx.create_group("Youth").await;

    for _ in 0..2 {
        ctx.post(&format!("/api/groups/{}/assign", youth), &token, json!({ "memberId": member }))
            .await;
    }

    let view = ctx.get(&format!("/api/groups/{}", youth), &token).await.json();
    assert_eq!(member_ids(&view), vec![member]);
}

#[tokio::test]
async fn test_remove_clears_member_group() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token();
    let member = ctx.create_member(member_body("Alex", "male")).await;
    let youth = ctx.create_group("Youth").await;
    ctx.post(&format!("/api/groups/{}/assign", youth), &token, json!({ "memberId": member }))
        .await;

    let response = ctx
        .post(&format!("/api/groups/{}/remove", youth), &token, json!({ "memberId": member }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(member_ids(&response.json()).is_empty());

    let member_view = ctx.get(&format!("/api/members/{}", member), &token).await.json();
    assert!(member_view["smallGroup"].is_null());

    // Removing again is harmless
    let again = ctx
        .post(&format!("/api/groups/{}/remove", youth), &token, json!({ "memberId": member }))
        .await;
    assert_eq!(again.status, StatusCode::OK);
}

#[tokio::test]
async fn test_membership_on_unknown_group_is_not_found() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token();
    let member = ctx.create_member(member_body("Alex", "male")).await;

    for action in ["assign", "remove"] {
        let response = ctx
            .post(&format!("/api/groups/777/{}", action), &token, json!({ "memberId": member }))
            .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.json()["message"], "Group not found");
    }
}

#[tokio::test]
async fn test_membership_requires_member_id() {
    let ctx = TestContext::new().await;
    let youth = ctx.create_group("Youth").await;

    let response = ctx
        .post(&format!("/api/groups/{}/assign", youth), &ctx.admin_token(), json!({}))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_group_unassigns_every_member() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token();
    let youth = ctx.create_group("Youth").await;
    let mut members = Vec::new();
    for name in ["Alex", "Sam", "Jo"] {
        let id = ctx.create_member(member_body(name, "other")).await;
        ctx.post(&format!("/api/groups/{}/assign", youth), &token, json!({ "memberId": id }))
            .await;
        members.push(id);
    }

    let response = ctx.delete(&format!("/api/groups/{}", youth), &token).await;
    assert_eq!(response.json()["unassigned"], 3);

    for id in members {
        let view = ctx.get(&format!("/api/members/{}", id), &token).await.json();
        assert!(view["smallGroup"].is_null());
    }
    let filtered = ctx.get(&format!("/api/members?smallGroup={}", youth), &token).await.json();
    assert_eq!(filtered["total"], 0);
}

#[tokio::test]
async fn test_dangling_group_reference_reads_as_unassigned() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token();
    let member = ctx.create_member(member_body("Alex", "male")).await;
    let youth = ctx.create_group("Youth").await;
    ctx.post(&format!("/api/groups/{}/assign", youth), &token, json!({ "memberId": member }))
        .await;

    // Simulate a crash between the two halves of a cascade delete
    assert!(ctx.store.delete_group_raw(youth).await);

    let view = ctx.get(&format!("/api/members/{}", member), &token).await;
    assert_eq!(view.status, StatusCode::OK);
    assert!(view.json()["smallGroup"].is_null());

    let page = ctx.get("/api/members", &token).await.json();
    assert!(page["items"][0]["smallGroup"].is_null());
}
