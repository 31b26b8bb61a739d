use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize)]
pub struct OneTimeCodePath {
    pub action: String,
    pub code_id: String,
    pub resource_id: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 6, message = "Password too short - should be 6 chars minimum"))]
    pub password: String,
    pub password_confirmation: String,
}
