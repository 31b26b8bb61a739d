use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::controller;
use crate::AppState;

pub fn event_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", post(controller::create_event))
        .route(
            "/events/{event_id}",
            get(controller::get_event)
                .put(controller::update_event)
                .delete(controller::delete_event),
        )
        .route("/events/{event_id}/report", post(controller::report_event))
        .route(
            "/events/explore/{longitude}/{latitude}/{radius}/{creation_timestamp}",
            get(controller::explore),
        )
        .route(
            "/events/myEvents/{old_events_timestamp}/{new_events_timestamp}",
            get(controller::my_events),
        )
        .route(
            "/events/favEvents/{old_events_timestamp}/{new_events_timestamp}",
            get(controller::favorite_events),
        )
}
