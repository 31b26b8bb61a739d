use axum::{
    routing::{post, put},
    Router,
};
use std::sync::Arc;

use super::controller;
use crate::AppState;

pub fn user_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/users",
            post(controller::register)
                .get(controller::get_user)
                .delete(controller::delete_user),
        )
        .route("/users/forgotPassword", post(controller::forgot_password))
        .route("/users/changeUsername", put(controller::change_username))
        .route("/users/credentials", put(controller::change_password))
        .route(
            "/users/subscribedCategories",
            put(controller::update_subscribed_categories),
        )
        .route(
            "/users/pushNotificationToken",
            put(controller::update_push_notification_token),
        )
        .route("/users/events/{event_id}", put(controller::toggle_favorite))
        .route(
            "/sessions",
            post(controller::create_session).delete(controller::delete_session),
        )
}
