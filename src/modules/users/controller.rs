use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;
use validator::Validate;

use crate::modules::moderation::crud::OneTimeCodeCrud;
use crate::modules::moderation::model::{password_action_url, CodeAction};
use crate::modules::users::{
    crud::UserCrud,
    model::{AUTH_METHOD_EMAIL, AUTH_METHOD_GOOGLE},
    schema::{
        CreateSessionRequest, CreateUserRequest, ForgotPasswordRequest, MessageResponse,
        SessionResponse, UpdatePasswordRequest, UpdatePushNotificationTokenRequest,
        UpdateSubscribedCategoriesRequest, UpdateUsernameRequest, UserResponse,
    },
};
use crate::services::auth::AuthUser;
use crate::services::error::{ApiError, ApiResult};
use crate::services::{hashing, transactions};
use crate::AppState;

// =============================================================================
// REGISTRATION & SESSIONS
// =============================================================================

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    req.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    if req.password != req.password_confirmation {
        return Err(ApiError::bad_request("Passwords do not match"));
    }

    if !transactions::is_valid_username(&req.name) {
        return Err(ApiError::bad_request("Username is invalid"));
    }

    if req.name == req.email {
        return Err(ApiError::bad_request("Username must not equal the email"));
    }

    let crud = UserCrud::new(state.db.clone());

    if crud.find_by_email(&req.email).await?.is_some() {
        return Err(ApiError::conflict("Email already exists"));
    }
    if crud.find_by_name(&req.name).await?.is_some() {
        return Err(ApiError::conflict("Username already exists"));
    }

    let password_hash =
        hashing::hash_password(&req.password).map_err(|e| ApiError::Internal(e.to_string()))?;

    let user = crud
        .create(&req.email, &req.name, &password_hash, AUTH_METHOD_EMAIL)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse::from_user(user, Vec::new())),
    ))
}

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSessionRequest>,
) -> ApiResult<Json<SessionResponse>> {
    req.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let crud = UserCrud::new(state.db.clone());

    let user = crud
        .find_by_email(&req.email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let valid = hashing::verify_password(&req.password, &user.password_hash)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if !valid {
        return Err(ApiError::InvalidCredentials);
    }

    let session_id = crud.create_session(&user.id).await?;

    let access_token = state
        .jwt_service
        .create_access_token(&user.id, &session_id)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let refresh_token = state
        .jwt_service
        .create_refresh_token(&user.id, &session_id)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(SessionResponse {
        access_token,
        refresh_token,
        token_type: "Bearer",
        expires_in: state.jwt_service.access_token_duration_secs(),
    }))
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<MessageResponse>> {
    UserCrud::new(state.db.clone())
        .invalidate_session(&auth.session_id)
        .await?;
    Ok(Json(MessageResponse {
        message: "Session invalidated",
    }))
}

// =============================================================================
// PROFILE
// =============================================================================

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<UserResponse>> {
    let crud = UserCrud::new(state.db.clone());
    let user = crud
        .find_by_id(&auth.user_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let categories = crud.subscribed_categories(&auth.user_id).await?;
    Ok(Json(UserResponse::from_user(user, categories)))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<MessageResponse>> {
    transactions::cascade_delete_user(&state.db, &auth.user_id).await?;
    Ok(Json(MessageResponse {
        message: "User deleted",
    }))
}

pub async fn change_username(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<UpdateUsernameRequest>,
) -> ApiResult<Json<UserResponse>> {
    transactions::change_username(&state.db, &auth.user_id, &req.new_username).await?;

    let crud = UserCrud::new(state.db.clone());
    let user = crud
        .find_by_id(&auth.user_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let categories = crud.subscribed_categories(&auth.user_id).await?;
    Ok(Json(UserResponse::from_user(user, categories)))
}

pub async fn change_password(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<UpdatePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    if req.new_password != req.password_confirmation {
        return Err(ApiError::bad_request("Passwords do not match"));
    }

    let crud = UserCrud::new(state.db.clone());
    let user = crud
        .find_by_id(&auth.user_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let valid = hashing::verify_password(&req.old_password, &user.password_hash)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if !valid {
        return Err(ApiError::forbidden("Old password is incorrect"));
    }

    let hash =
        hashing::hash_password(&req.new_password).map_err(|e| ApiError::Internal(e.to_string()))?;
    crud.update_password_hash(&auth.user_id, &hash).await?;

    Ok(Json(MessageResponse {
        message: "Password updated",
    }))
}

pub async fn update_subscribed_categories(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<UpdateSubscribedCategoriesRequest>,
) -> ApiResult<Json<UserResponse>> {
    let crud = UserCrud::new(state.db.clone());
    crud.set_subscribed_categories(&auth.user_id, &req.subscribed_categories)
        .await?;

    let user = crud
        .find_by_id(&auth.user_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(UserResponse::from_user(
        user,
        req.subscribed_categories,
    )))
}

pub async fn update_push_notification_token(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<UpdatePushNotificationTokenRequest>,
) -> ApiResult<Json<MessageResponse>> {
    UserCrud::new(state.db.clone())
        .update_push_token(&auth.user_id, &req.push_notification_token)
        .await?;
    Ok(Json(MessageResponse {
        message: "Push notification token updated",
    }))
}

// =============================================================================
// FAVORITES
// =============================================================================

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeCountResponse {
    pub like_count: i32,
}

pub async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(event_id): Path<String>,
) -> ApiResult<Json<LikeCountResponse>> {
    let like_count = transactions::toggle_favorite(&state.db, &auth.user_id, &event_id).await?;
    Ok(Json(LikeCountResponse { like_count }))
}

// =============================================================================
// PASSWORD RESET
// =============================================================================

pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let user = UserCrud::new(state.db.clone())
        .find_by_email(&req.email)
        .await?
        .ok_or(ApiError::NotFound)?;

    // Google accounts have no password to reset; indistinguishable from an
    // unknown address so the endpoint does not leak which emails exist.
    if user.auth_method == AUTH_METHOD_GOOGLE {
        return Err(ApiError::NotFound);
    }

    let code = OneTimeCodeCrud::new(state.db.clone())
        .create(&[CodeAction::ForgotPassword], &user.id)
        .await?;

    let link = password_action_url(
        &state.config.server_url,
        CodeAction::ForgotPassword,
        &code.id,
        &user.id,
    );
    let body = format!(
        "To reset your password please click on the following link:\n{link}"
    );

    let mailer = state.mailer.clone();
    let email = user.email.clone();
    tokio::spawn(async move {
        mailer.send(&email, "Forgot Password", &body).await;
    });

    Ok(Json(MessageResponse {
        message: "Password reset mail sent",
    }))
}
