use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;
use validator::Validate;

use crate::modules::events::{
    crud::EventCrud,
    model::Event,
    schema::{CreateEventRequest, ExplorePath, TimestampWindowPath, UpdateEventRequest},
};
use crate::modules::moderation::crud::OneTimeCodeCrud;
use crate::modules::moderation::model::{event_action_url, CodeAction};
use crate::modules::users::crud::UserCrud;
use crate::services::auth::AuthUser;
use crate::services::error::{ApiError, ApiResult};
use crate::services::{profanity, transactions};
use crate::AppState;

/// Radius within which subscribers are notified about new events, in meters.
const PUSH_NOTIFICATION_RADIUS_METERS: f64 = 10_000.0;

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(mut req): Json<CreateEventRequest>,
) -> ApiResult<(StatusCode, Json<Event>)> {
    req.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let users = UserCrud::new(state.db.clone());
    let user = users
        .find_by_id(&auth.user_id)
        .await?
        .ok_or_else(|| ApiError::conflict("User not found"))?;

    users
        .consume_event_quota(&user, state.config.max_event_creations_per_day)
        .await?;

    req.event_name = profanity::clean(&req.event_name);
    req.description = profanity::clean(&req.description);

    let event = EventCrud::new(state.db.clone()).create(&auth.user_id, &req).await?;

    // Fan the announcement out to nearby subscribers off the request path.
    let push = state.push.clone();
    let db = state.db.clone();
    let owner = auth.user_id.clone();
    let announced = event.clone();
    tokio::spawn(async move {
        let users = UserCrud::new(db);
        for category in &announced.category {
            let tokens = users
                .push_tokens_near(
                    category,
                    announced.location.longitude(),
                    announced.location.latitude(),
                    PUSH_NOTIFICATION_RADIUS_METERS,
                    &owner,
                )
                .await;
            match tokens {
                Ok(tokens) => {
                    push.send_new_event(&tokens, &announced.id, category, &announced.event_name)
                        .await;
                }
                Err(e) => {
                    tracing::error!(event_id = %announced.id, "push fan-out failed: {}", e);
                }
            }
        }
    });

    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(event_id): Path<String>,
    Json(mut req): Json<UpdateEventRequest>,
) -> ApiResult<Json<Event>> {
    req.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let crud = EventCrud::new(state.db.clone());
    let event = crud.find_by_id(&event_id).await?.ok_or(ApiError::NotFound)?;

    if event.user != auth.user_id {
        return Err(ApiError::forbidden(
            "You don't have the permission to update this event",
        ));
    }

    req.event_name = profanity::clean(&req.event_name);
    req.description = profanity::clean(&req.description);

    let updated = crud.update(&event_id, &req).await?;
    Ok(Json(updated))
}

pub async fn get_event(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(event_id): Path<String>,
) -> ApiResult<Json<Event>> {
    let event = EventCrud::new(state.db.clone())
        .get_gated(&event_id, &auth.user_id)
        .await?;
    Ok(Json(event))
}

/// Geo discovery. Also records the requester's position as their last known
/// location, which later scopes push notification fan-out.
pub async fn explore(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(path): Path<ExplorePath>,
) -> ApiResult<Json<Vec<Event>>> {
    let users = UserCrud::new(state.db.clone());
    users
        .update_last_location(&auth.user_id, path.longitude, path.latitude)
        .await?;

    let crud = EventCrud::new(state.db.clone());
    let events = crud
        .discover(
            path.longitude,
            path.latitude,
            path.radius,
            path.creation_timestamp,
            &auth.user_id,
            state.config.reports_to_quarantine,
        )
        .await?;

    // View consumption happens after the result set is fixed, so a capped
    // event is still delivered on the request that uses up its last view.
    // Best-effort: a failed recording never costs the requester the results.
    for event in &events {
        if let Err(e) = crud.mark_viewed(&event.id, &auth.user_id).await {
            tracing::error!("failed to record view of event {}: {e}", event.id);
        }
    }

    Ok(Json(events))
}

pub async fn my_events(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(path): Path<TimestampWindowPath>,
) -> ApiResult<Json<Vec<Event>>> {
    let events = EventCrud::new(state.db.clone())
        .my_events(
            &auth.user_id,
            path.old_events_timestamp,
            path.new_events_timestamp,
        )
        .await?;
    Ok(Json(events))
}

pub async fn favorite_events(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(path): Path<TimestampWindowPath>,
) -> ApiResult<Json<Vec<Event>>> {
    let events = EventCrud::new(state.db.clone())
        .favorite_events(
            &auth.user_id,
            path.old_events_timestamp,
            path.new_events_timestamp,
        )
        .await?;
    Ok(Json(events))
}

pub async fn report_event(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(event_id): Path<String>,
) -> ApiResult<StatusCode> {
    let outcome = EventCrud::new(state.db.clone())
        .report(&event_id, &auth.user_id)
        .await?;

    // Quarantine fires exactly once, on the report that reaches the threshold.
    if outcome.reports == state.config.reports_to_quarantine {
        let users = UserCrud::new(state.db.clone());
        let owner = users.find_by_id(&outcome.event.user).await?;

        let Some(owner) = owner else {
            // Orphaned event, nobody can answer a moderation mail for it.
            transactions::hard_delete_event(&state.db, &event_id).await?;
            return Ok(StatusCode::OK);
        };

        let code = OneTimeCodeCrud::new(state.db.clone())
            .create(&[CodeAction::Delete, CodeAction::Approve], &event_id)
            .await?;

        let delete_link = event_action_url(
            &state.config.server_url,
            CodeAction::Delete,
            &code.id,
            &event_id,
        );
        let approve_link = event_action_url(
            &state.config.server_url,
            CodeAction::Approve,
            &code.id,
            &event_id,
        );
        let body = format!(
            "The event \"{}\" from {} with email \"{}\" was reported {} times.\n\
             Please follow one of the links underneath to delete or approve the event.\n\
             Delete: {}\nApprove: {}",
            outcome.event.event_name,
            owner.name,
            owner.email,
            outcome.reports,
            delete_link,
            approve_link,
        );

        let mailer = state.mailer.clone();
        tokio::spawn(async move {
            mailer
                .send_moderation_mail("Event has been reported", &body)
                .await;
        });
    }

    Ok(StatusCode::OK)
}

pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(event_id): Path<String>,
) -> ApiResult<StatusCode> {
    let crud = EventCrud::new(state.db.clone());
    let event = crud.find_by_id(&event_id).await?.ok_or(ApiError::NotFound)?;

    if event.user != auth.user_id {
        return Err(ApiError::forbidden(
            "You don't have the permission to delete this event",
        ));
    }

    transactions::cascade_delete_event(&state.db, &event_id).await?;
    Ok(StatusCode::OK)
}
