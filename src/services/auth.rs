use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use std::sync::Arc;

use crate::modules::users::model::Session;
use crate::services::error::ApiError;
use crate::AppState;

/// Authenticated requester, extracted from the bearer token. The session the
/// token was minted for must still be valid; logout and account deletion
/// revoke it, which cuts off tokens that are otherwise unexpired.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub session_id: String,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::InvalidCredentials)?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::InvalidCredentials)?;

        let (user_id, session_id) = match state.jwt_service.verify_access_token(token) {
            Ok(data) => (data.claims.sub, data.claims.sid),
            Err(_) => {
                // A stale access token can ride on the long-lived refresh
                // token from the same session.
                let refresh = parts
                    .headers
                    .get("x-refresh")
                    .and_then(|v| v.to_str().ok())
                    .ok_or(ApiError::InvalidCredentials)?;
                let data = state
                    .jwt_service
                    .verify_refresh_token(refresh)
                    .map_err(|_| ApiError::InvalidCredentials)?;
                (data.claims.sub, data.claims.sid)
            }
        };

        let session = sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = ?")
            .bind(&session_id)
            .fetch_optional(&state.db)
            .await?;

        match session {
            Some(s) if s.valid => Ok(AuthUser { user_id, session_id }),
            _ => Err(ApiError::InvalidCredentials),
        }
    }
}
