use axum::http::StatusCode;
use serde_json::json;
use serial_test::serial;

use crate::common::{test_email, test_name, test_password, TestContext};

#[tokio::test]
#[serial]
async fn the_full_reset_flow_sets_a_new_password() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let email = test_email();
    let response = ctx
        .server
        .post("/api/users")
        .json(&json!({
            "name": test_name("uma"),
            "email": email,
            "password": test_password(),
            "passwordConfirmation": test_password()
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let user_id = response.json::<serde_json::Value>()["id"]
        .as_str()
        .expect("id")
        .to_string();

    ctx.server
        .post("/api/users/forgotPassword")
        .json(&json!({"email": email}))
        .await
        .assert_status_ok();

    let forgot_code: String =
        sqlx::query_scalar("SELECT id FROM one_time_codes WHERE resource_id = ?")
            .bind(&user_id)
            .fetch_one(&ctx.db)
            .await
            .expect("forgot code");

    // Following the mail link renders the form and exchanges the code.
    let response = ctx
        .server
        .get(&format!(
            "/api/users/passwordAction/forgotPassword/{forgot_code}/{user_id}"
        ))
        .await;
    response.assert_status_ok();
    assert!(response.text().contains("Change Password"));

    let reset_code: String = sqlx::query_scalar(
        "SELECT id FROM one_time_codes WHERE resource_id = ? AND actions = 'resetPassword'",
    )
    .bind(&user_id)
    .fetch_one(&ctx.db)
    .await
    .expect("reset code");
    assert_ne!(reset_code, forgot_code);

    // The forgotPassword code is already spent.
    ctx.server
        .get(&format!(
            "/api/users/passwordAction/forgotPassword/{forgot_code}/{user_id}"
        ))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // The form posts the new password against the exchanged code.
    ctx.server
        .post(&format!(
            "/api/users/passwordAction/resetPassword/resetPassword/{reset_code}/{user_id}"
        ))
        .json(&json!({
            "password": "BrandNewPass1!",
            "passwordConfirmation": "BrandNewPass1!"
        }))
        .await
        .assert_status_ok();

    // Old password no longer works, the new one does.
    ctx.server
        .post("/api/sessions")
        .json(&json!({"email": email, "password": test_password()}))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    ctx.server
        .post("/api/sessions")
        .json(&json!({"email": email, "password": "BrandNewPass1!"}))
        .await
        .assert_status_ok();

    // The reset code is single-use too.
    ctx.server
        .post(&format!(
            "/api/users/passwordAction/resetPassword/resetPassword/{reset_code}/{user_id}"
        ))
        .json(&json!({
            "password": "AnotherPass1!",
            "passwordConfirmation": "AnotherPass1!"
        }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn forgot_password_for_an_unknown_email_is_not_found() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    ctx.server
        .post("/api/users/forgotPassword")
        .json(&json!({"email": test_email()}))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn mismatched_confirmation_leaves_the_code_unspent() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let email = test_email();
    let response = ctx
        .server
        .post("/api/users")
        .json(&json!({
            "name": test_name("vito"),
            "email": email,
            "password": test_password(),
            "passwordConfirmation": test_password()
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let user_id = response.json::<serde_json::Value>()["id"]
        .as_str()
        .expect("id")
        .to_string();

    let code_id = uuid::Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO one_time_codes (id, actions, resource_id, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&code_id)
    .bind("resetPassword")
    .bind(&user_id)
    .bind(chrono::Utc::now().timestamp_millis())
    .execute(&ctx.db)
    .await
    .expect("insert code");

    ctx.server
        .post(&format!(
            "/api/users/passwordAction/resetPassword/resetPassword/{code_id}/{user_id}"
        ))
        .json(&json!({
            "password": "BrandNewPass1!",
            "passwordConfirmation": "SomethingElse1!"
        }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let codes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM one_time_codes WHERE id = ?")
        .bind(&code_id)
        .fetch_one(&ctx.db)
        .await
        .expect("count");
    assert_eq!(codes, 1);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn forgot_password_hides_google_accounts() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    // Google accounts have no password; the endpoint must answer exactly
    // like it does for an unknown address.
    let email = test_email();
    sqlx::query(
        "INSERT INTO users (id, email, name, password_hash, auth_method)
         VALUES (?, ?, ?, '', 'google')",
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(&email)
    .bind(test_name("gus"))
    .execute(&ctx.db)
    .await
    .expect("insert user");

    ctx.server
        .post("/api/users/forgotPassword")
        .json(&json!({"email": email}))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    ctx.cleanup().await;
}
