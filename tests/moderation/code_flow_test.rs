use axum::http::StatusCode;
use serial_test::serial;

use crate::common::{test_name, TestContext};

/// Reports the event from two fresh accounts, which is the quarantine
/// threshold in the test configuration, and returns the minted code id.
async fn quarantine_event(ctx: &TestContext, event_id: &str) -> String {
    for name in ["rep1", "rep2"] {
        let (_, token) = ctx.register_and_login(&test_name(name)).await;
        ctx.server
            .post(&format!("/api/events/{event_id}/report"))
            .authorization_bearer(&token)
            .await
            .assert_status_ok();
    }

    sqlx::query_scalar("SELECT id FROM one_time_codes WHERE resource_id = ?")
        .bind(event_id)
        .fetch_one(&ctx.db)
        .await
        .expect("code row")
}

#[tokio::test]
#[serial]
async fn approving_clears_reports_and_restores_discovery() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (_, owner_token) = ctx.register_and_login(&test_name("noel")).await;
    let event_id = ctx.create_event(&owner_token, "Wrongly reported", -1).await;
    let code_id = quarantine_event(&ctx, &event_id).await;

    let response = ctx
        .server
        .get(&format!("/api/events/reportAction/approve/{code_id}/{event_id}"))
        .await;
    response.assert_status_ok();
    assert!(response.text().contains("Event Approved"));

    let reports: i32 = sqlx::query_scalar("SELECT reports FROM events WHERE id = ?")
        .bind(&event_id)
        .fetch_one(&ctx.db)
        .await
        .expect("event row");
    assert_eq!(reports, 0);

    let reporters: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM event_reporters WHERE event_id = ?")
            .bind(&event_id)
            .fetch_one(&ctx.db)
            .await
            .expect("count");
    assert_eq!(reporters, 0);

    // A fresh account rediscovers the event from a zero cursor.
    let (_, token) = ctx.register_and_login(&test_name("otis")).await;
    let response = ctx
        .server
        .get("/api/events/explore/8.40/49.00/5000/0")
        .authorization_bearer(&token)
        .await;
    let body: serde_json::Value = response.json();
    let ids: Vec<&str> = body
        .as_array()
        .expect("array body")
        .iter()
        .filter_map(|e| e["id"].as_str())
        .collect();
    assert!(ids.contains(&event_id.as_str()));

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn a_code_is_spent_by_its_first_use() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (_, owner_token) = ctx.register_and_login(&test_name("pia")).await;
    let event_id = ctx.create_event(&owner_token, "Single use", -1).await;
    let code_id = quarantine_event(&ctx, &event_id).await;

    ctx.server
        .get(&format!("/api/events/reportAction/approve/{code_id}/{event_id}"))
        .await
        .assert_status_ok();

    // Second click on either link of the same mail fails.
    ctx.server
        .get(&format!("/api/events/reportAction/approve/{code_id}/{event_id}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    ctx.server
        .get(&format!("/api/events/reportAction/delete/{code_id}/{event_id}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn deleting_removes_the_event_and_its_children_for_good() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (_, owner_token) = ctx.register_and_login(&test_name("remy")).await;
    let event_id = ctx.create_event(&owner_token, "To be purged", -1).await;

    ctx.server
        .post(&format!("/api/events/{event_id}/comments"))
        .authorization_bearer(&owner_token)
        .json(&serde_json::json!({"commentText": "goodbye"}))
        .await
        .assert_status(StatusCode::CREATED);

    let code_id = quarantine_event(&ctx, &event_id).await;

    let response = ctx
        .server
        .get(&format!("/api/events/reportAction/delete/{code_id}/{event_id}"))
        .await;
    response.assert_status_ok();
    assert!(response.text().contains("Event Deleted"));

    let events: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE id = ?")
        .bind(&event_id)
        .fetch_one(&ctx.db)
        .await
        .expect("count");
    assert_eq!(events, 0);

    let comments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE event_id = ?")
        .bind(&event_id)
        .fetch_one(&ctx.db)
        .await
        .expect("count");
    assert_eq!(comments, 0);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn an_expired_code_is_rejected_and_consumed() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (_, owner_token) = ctx.register_and_login(&test_name("stan")).await;
    let event_id = ctx.create_event(&owner_token, "Stale link", -1).await;

    let code_id = uuid::Uuid::new_v4().to_string();
    let stale = chrono::Utc::now().timestamp_millis() - ctx.config.one_time_code_ttl_ms - 1;
    sqlx::query(
        "INSERT INTO one_time_codes (id, actions, resource_id, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&code_id)
    .bind("delete,approve")
    .bind(&event_id)
    .bind(stale)
    .execute(&ctx.db)
    .await
    .expect("insert code");

    ctx.server
        .get(&format!("/api/events/reportAction/approve/{code_id}/{event_id}"))
        .await
        .assert_status(StatusCode::GONE);

    let codes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM one_time_codes WHERE id = ?")
        .bind(&code_id)
        .fetch_one(&ctx.db)
        .await
        .expect("count");
    assert_eq!(codes, 0);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn a_code_only_works_for_its_own_resource_and_actions() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (_, owner_token) = ctx.register_and_login(&test_name("tom")).await;
    let event_id = ctx.create_event(&owner_token, "Bound code", -1).await;
    let other_id = ctx.create_event(&owner_token, "Other event", -1).await;
    let code_id = quarantine_event(&ctx, &event_id).await;

    // Wrong resource.
    ctx.server
        .get(&format!("/api/events/reportAction/approve/{code_id}/{other_id}"))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    // Action outside the code's grant.
    ctx.server
        .get(&format!("/api/events/reportAction/resetPassword/{code_id}/{event_id}"))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    // The code survives failed validation and still works afterwards.
    ctx.server
        .get(&format!("/api/events/reportAction/approve/{code_id}/{event_id}"))
        .await
        .assert_status_ok();

    ctx.cleanup().await;
}
