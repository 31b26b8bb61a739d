use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::controller;
use crate::AppState;

pub fn comment_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/events/{event_id}/comments",
            post(controller::create_comment),
        )
        .route(
            "/events/{event_id}/comments/{comment_id}/report",
            post(controller::report_comment),
        )
        .route(
            "/events/{event_id}/comments/{old_events_timestamp}/{new_events_timestamp}/{count_comments}",
            get(controller::get_comments),
        )
}
