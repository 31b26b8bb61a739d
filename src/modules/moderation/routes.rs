use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::controller;
use crate::AppState;

/// One-time-code endpoints. These are followed from emails without a bearer
/// token; the code itself is the credential.
pub fn moderation_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/events/reportAction/{action}/{code_id}/{resource_id}",
            get(controller::event_action),
        )
        .route(
            "/comments/{action}/{code_id}/{resource_id}",
            get(controller::comment_action),
        )
        .route(
            "/users/passwordAction/{action}/{code_id}/{resource_id}",
            get(controller::forgot_password_action),
        )
        .route(
            "/users/passwordAction/resetPassword/{action}/{code_id}/{resource_id}",
            post(controller::reset_password_action),
        )
}
