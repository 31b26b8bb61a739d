use axum::http::StatusCode;
use serial_test::serial;

use crate::common::{test_name, TestContext};

#[tokio::test]
#[serial]
async fn capped_event_serves_until_the_views_run_out() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (_, owner_token) = ctx.register_and_login(&test_name("finn")).await;
    let event_id = ctx.create_event(&owner_token, "One view only", 0).await;

    // First viewer consumes the only view.
    let (_, first_token) = ctx.register_and_login(&test_name("gwen")).await;
    ctx.server
        .get(&format!("/api/events/{event_id}"))
        .authorization_bearer(&first_token)
        .await
        .assert_status_ok();

    // Second viewer hits a closed gate.
    let (_, second_token) = ctx.register_and_login(&test_name("hugo")).await;
    ctx.server
        .get(&format!("/api/events/{event_id}"))
        .authorization_bearer(&second_token)
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    // The first viewer keeps access, no extra view is consumed.
    ctx.server
        .get(&format!("/api/events/{event_id}"))
        .authorization_bearer(&first_token)
        .await
        .assert_status_ok();

    let viewer_count: i32 = sqlx::query_scalar("SELECT viewer_count FROM events WHERE id = ?")
        .bind(&event_id)
        .fetch_one(&ctx.db)
        .await
        .expect("event row");
    assert_eq!(viewer_count, 1);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn owner_always_passes_the_gate_without_consuming_a_view() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (_, owner_token) = ctx.register_and_login(&test_name("iris")).await;
    let event_id = ctx.create_event(&owner_token, "Owner preview", 0).await;

    ctx.server
        .get(&format!("/api/events/{event_id}"))
        .authorization_bearer(&owner_token)
        .await
        .assert_status_ok();

    let viewer_count: i32 = sqlx::query_scalar("SELECT viewer_count FROM events WHERE id = ?")
        .bind(&event_id)
        .fetch_one(&ctx.db)
        .await
        .expect("event row");
    assert_eq!(viewer_count, 0);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn unlimited_events_never_track_viewers() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (_, owner_token) = ctx.register_and_login(&test_name("jack")).await;
    let event_id = ctx.create_event(&owner_token, "Unlimited", -1).await;

    for name in ["kate", "luke", "mona"] {
        let (_, token) = ctx.register_and_login(&test_name(name)).await;
        ctx.server
            .get(&format!("/api/events/{event_id}"))
            .authorization_bearer(&token)
            .await
            .assert_status_ok();
    }

    let viewer_count: i32 = sqlx::query_scalar("SELECT viewer_count FROM events WHERE id = ?")
        .bind(&event_id)
        .fetch_one(&ctx.db)
        .await
        .expect("event row");
    assert_eq!(viewer_count, 0);

    ctx.cleanup().await;
}
