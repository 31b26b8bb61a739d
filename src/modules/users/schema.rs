use serde::{Deserialize, Serialize};
use validator::Validate;

use super::model::User;

// =============================================================================
// REGISTER
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    #[validate(length(min = 6, message = "Password too short - should be 6 chars minimum"))]
    pub password: String,
    pub password_confirmation: String,
    #[validate(email(message = "Not a valid email"))]
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub auth_method: String,
    pub push_notification_token: String,
    pub subscribed_categories: Vec<String>,
}

impl UserResponse {
    pub fn from_user(user: User, subscribed_categories: Vec<String>) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            auth_method: user.auth_method,
            push_notification_token: user.push_notification_token,
            subscribed_categories,
        }
    }
}

// =============================================================================
// SESSIONS
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[validate(email(message = "Not a valid email"))]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

// =============================================================================
// PROFILE UPDATES
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub old_password: String,
    #[validate(length(min = 6, message = "Password too short - should be 6 chars minimum"))]
    pub new_password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUsernameRequest {
    pub new_username: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubscribedCategoriesRequest {
    pub subscribed_categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePushNotificationTokenRequest {
    pub push_notification_token: String,
}

// =============================================================================
// PASSWORD RESET
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Not a valid email"))]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
