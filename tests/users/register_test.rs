use axum::http::StatusCode;
use serde_json::json;
use serial_test::serial;

use crate::common::{test_email, test_name, test_password, TestContext};

#[tokio::test]
#[serial]
async fn register_with_valid_data_returns_created() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let email = test_email();
    let response = ctx
        .server
        .post("/api/users")
        .json(&json!({
            "name": test_name("alice"),
            "email": email,
            "password": test_password(),
            "passwordConfirmation": test_password()
        }))
        .await;

    response.assert_status(StatusCode::CREATED);

    let body: serde_json::Value = response.json();
    assert_eq!(body["email"], email);
    assert_eq!(body["authMethod"], "email");
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn register_with_duplicate_email_returns_conflict() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let email = test_email();
    let payload = |name: String| {
        json!({
            "name": name,
            "email": email,
            "password": test_password(),
            "passwordConfirmation": test_password()
        })
    };

    ctx.server
        .post("/api/users")
        .json(&payload(test_name("bob")))
        .await
        .assert_status(StatusCode::CREATED);

    ctx.server
        .post("/api/users")
        .json(&payload(test_name("carol")))
        .await
        .assert_status(StatusCode::CONFLICT);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn register_with_mismatched_passwords_returns_bad_request() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let response = ctx
        .server
        .post("/api/users")
        .json(&json!({
            "name": test_name("dave"),
            "email": test_email(),
            "password": "Password123!",
            "passwordConfirmation": "Different123!"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn register_with_invalid_username_returns_bad_request() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let response = ctx
        .server
        .post("/api/users")
        .json(&json!({
            "name": "bad  name!!",
            "email": test_email(),
            "password": test_password(),
            "passwordConfirmation": test_password()
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}
