use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use chrono::Utc;
use std::sync::Arc;
use validator::Validate;

use crate::modules::comments::crud::CommentCrud;
use crate::modules::events::crud::EventCrud;
use crate::modules::moderation::{
    crud::OneTimeCodeCrud,
    model::{CodeAction, OneTimeCode},
    schema::{OneTimeCodePath, ResetPasswordRequest},
};
use crate::modules::users::crud::UserCrud;
use crate::services::error::{ApiError, ApiResult};
use crate::services::{hashing, html, transactions};
use crate::AppState;

type PageResponse = (StatusCode, Html<String>);

// =============================================================================
// CODE VALIDATION
// =============================================================================

/// Shared validation for all moderation links. Resolves the code, checks that
/// it permits the requested action and names the requested resource, and
/// handles expiry. An expired code is consumed on sight so the link cannot be
/// probed again.
async fn validate_code(
    state: &AppState,
    path: &OneTimeCodePath,
) -> ApiResult<(CodeAction, OneTimeCode)> {
    let action = CodeAction::parse(&path.action)
        .ok_or_else(|| ApiError::bad_request("Unknown action"))?;

    let codes = OneTimeCodeCrud::new(state.db.clone());
    let code = codes.find(&path.code_id).await?.ok_or(ApiError::NotFound)?;

    if !code.permits(action) {
        return Err(ApiError::bad_request("Action not permitted by this code"));
    }
    if code.resource_id != path.resource_id {
        return Err(ApiError::bad_request("Code does not match this resource"));
    }

    if code.is_expired(Utc::now().timestamp_millis(), state.config.one_time_code_ttl_ms) {
        codes.consume(&code.id).await?;
        return Err(ApiError::Expired);
    }

    Ok((action, code))
}

/// Spends the code. Exactly one caller can get past this point per code; the
/// terminal action runs only after the code is gone.
async fn consume_code(state: &AppState, code_id: &str) -> ApiResult<()> {
    let consumed = OneTimeCodeCrud::new(state.db.clone()).consume(code_id).await?;
    if !consumed {
        return Err(ApiError::NotFound);
    }
    Ok(())
}

fn error_page(e: ApiError) -> PageResponse {
    (e.status_code(), Html(html::action_error()))
}

// =============================================================================
// EVENT & COMMENT MODERATION
// =============================================================================

pub async fn event_action(
    State(state): State<Arc<AppState>>,
    Path(path): Path<OneTimeCodePath>,
) -> PageResponse {
    match handle_event_action(&state, &path).await {
        Ok(page) => page,
        Err(e) => error_page(e),
    }
}

async fn handle_event_action(
    state: &AppState,
    path: &OneTimeCodePath,
) -> ApiResult<PageResponse> {
    let (action, code) = validate_code(state, path).await?;

    match action {
        CodeAction::Approve => {
            consume_code(state, &code.id).await?;
            EventCrud::new(state.db.clone()).approve(&path.resource_id).await?;
            Ok((StatusCode::OK, Html(html::event_approved())))
        }
        CodeAction::Delete => {
            consume_code(state, &code.id).await?;
            transactions::hard_delete_event(&state.db, &path.resource_id).await?;
            Ok((StatusCode::OK, Html(html::event_deleted())))
        }
        _ => Err(ApiError::bad_request("Unknown action")),
    }
}

pub async fn comment_action(
    State(state): State<Arc<AppState>>,
    Path(path): Path<OneTimeCodePath>,
) -> PageResponse {
    match handle_comment_action(&state, &path).await {
        Ok(page) => page,
        Err(e) => error_page(e),
    }
}

async fn handle_comment_action(
    state: &AppState,
    path: &OneTimeCodePath,
) -> ApiResult<PageResponse> {
    let (action, code) = validate_code(state, path).await?;

    match action {
        CodeAction::Approve => {
            consume_code(state, &code.id).await?;
            CommentCrud::new(state.db.clone()).approve(&path.resource_id).await?;
            Ok((StatusCode::OK, Html(html::comment_approved())))
        }
        CodeAction::Delete => {
            consume_code(state, &code.id).await?;
            CommentCrud::new(state.db.clone()).delete(&path.resource_id).await?;
            Ok((StatusCode::OK, Html(html::comment_deleted())))
        }
        _ => Err(ApiError::bad_request("Unknown action")),
    }
}

// =============================================================================
// PASSWORD RESET
// =============================================================================

/// Exchanges a `forgotPassword` code for a fresh `resetPassword` code and
/// renders the form that posts against it.
pub async fn forgot_password_action(
    State(state): State<Arc<AppState>>,
    Path(path): Path<OneTimeCodePath>,
) -> PageResponse {
    match handle_forgot_password_action(&state, &path).await {
        Ok(page) => page,
        Err(e) => error_page(e),
    }
}

async fn handle_forgot_password_action(
    state: &AppState,
    path: &OneTimeCodePath,
) -> ApiResult<PageResponse> {
    let (action, code) = validate_code(state, path).await?;

    if action != CodeAction::ForgotPassword {
        return Err(ApiError::bad_request("Unknown action"));
    }

    let user = UserCrud::new(state.db.clone())
        .find_by_id(&path.resource_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    consume_code(state, &code.id).await?;

    let reset_code = OneTimeCodeCrud::new(state.db.clone())
        .create(&[CodeAction::ResetPassword], &user.id)
        .await?;

    Ok((
        StatusCode::OK,
        Html(html::reset_password_form(
            &state.config.server_url,
            &reset_code.id,
            &user.id,
        )),
    ))
}

/// Terminal step of the reset flow, posted by the form itself.
pub async fn reset_password_action(
    State(state): State<Arc<AppState>>,
    Path(path): Path<OneTimeCodePath>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<StatusCode> {
    req.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    if req.password != req.password_confirmation {
        return Err(ApiError::bad_request("Passwords do not match"));
    }

    let (action, code) = validate_code(&state, &path).await?;

    if action != CodeAction::ResetPassword {
        return Err(ApiError::bad_request("Unknown action"));
    }

    let users = UserCrud::new(state.db.clone());
    let user = users
        .find_by_id(&path.resource_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    consume_code(&state, &code.id).await?;

    let hash =
        hashing::hash_password(&req.password).map_err(|e| ApiError::Internal(e.to_string()))?;
    users.update_password_hash(&user.id, &hash).await?;

    Ok(StatusCode::OK)
}
