use axum::http::StatusCode;
use serde_json::json;
use serial_test::serial;

use crate::common::{test_config, test_name, TestContext};

#[tokio::test]
#[serial]
async fn create_comment_snapshots_the_author_name() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let name = test_name("anna");
    let (user_id, token) = ctx.register_and_login(&name).await;
    let event_id = ctx.create_event(&token, "Commented event", -1).await;

    let response = ctx
        .server
        .post(&format!("/api/events/{event_id}/comments"))
        .authorization_bearer(&token)
        .json(&json!({"commentText": "See you there"}))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["eventId"], event_id.as_str());
    assert_eq!(body["userId"], user_id.as_str());
    assert_eq!(body["author"], name.as_str());
    assert_eq!(body["commentText"], "See you there");
    assert_eq!(body["reports"], 0);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn commenting_a_missing_event_is_not_found() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (_, token) = ctx.register_and_login(&test_name("ben")).await;

    ctx.server
        .post("/api/events/no-such-event/comments")
        .authorization_bearer(&token)
        .json(&json!({"commentText": "hello?"}))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn comment_quota_rejects_the_creation_past_the_limit() {
    let mut config = test_config();
    config.max_comment_creations_per_day = 2;
    let Some(ctx) = TestContext::try_new_with(config).await else {
        return;
    };

    let (_, token) = ctx.register_and_login(&test_name("cory")).await;
    let event_id = ctx.create_event(&token, "Chatty event", -1).await;

    for i in 0..2 {
        ctx.server
            .post(&format!("/api/events/{event_id}/comments"))
            .authorization_bearer(&token)
            .json(&json!({"commentText": format!("comment {i}")}))
            .await
            .assert_status(StatusCode::CREATED);
    }

    ctx.server
        .post(&format!("/api/events/{event_id}/comments"))
        .authorization_bearer(&token)
        .json(&json!({"commentText": "one too many"}))
        .await
        .assert_status(StatusCode::CONFLICT);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn listing_respects_the_timestamp_gap_and_count() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (_, token) = ctx.register_and_login(&test_name("dana")).await;
    let event_id = ctx.create_event(&token, "Paginated event", -1).await;

    for i in 0..4 {
        ctx.server
            .post(&format!("/api/events/{event_id}/comments"))
            .authorization_bearer(&token)
            .json(&json!({"commentText": format!("comment {i}")}))
            .await
            .assert_status(StatusCode::CREATED);
    }

    // Full fetch, capped at 3, newest first.
    let response = ctx
        .server
        .get(&format!("/api/events/{event_id}/comments/0/0/3"))
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let comments = body.as_array().expect("array body");
    assert_eq!(comments.len(), 3);
    let timestamps: Vec<i64> = comments
        .iter()
        .map(|c| c["creationTimestamp"].as_i64().expect("timestamp"))
        .collect();
    assert!(timestamps.windows(2).all(|w| w[0] >= w[1]));

    // A gap covering all timestamps yields nothing new.
    let newest = timestamps[0];
    let response = ctx
        .server
        .get(&format!("/api/events/{event_id}/comments/0/{newest}/10"))
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body.as_array().expect("array body").is_empty());

    ctx.cleanup().await;
}
