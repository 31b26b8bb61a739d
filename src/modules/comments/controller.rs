use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;
use validator::Validate;

use crate::modules::comments::{
    crud::CommentCrud,
    model::Comment,
    schema::{CommentListPath, CreateCommentRequest},
};
use crate::modules::events::crud::EventCrud;
use crate::modules::moderation::crud::OneTimeCodeCrud;
use crate::modules::moderation::model::{comment_action_url, CodeAction};
use crate::modules::users::crud::UserCrud;
use crate::services::auth::AuthUser;
use crate::services::error::{ApiError, ApiResult};
use crate::services::profanity;
use crate::AppState;

pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(event_id): Path<String>,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    req.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let users = UserCrud::new(state.db.clone());
    let user = users
        .find_by_id(&auth.user_id)
        .await?
        .ok_or_else(|| ApiError::conflict("User not found"))?;

    users
        .consume_comment_quota(&user, state.config.max_comment_creations_per_day)
        .await?;

    EventCrud::new(state.db.clone())
        .find_by_id(&event_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let text = profanity::clean(&req.comment_text);

    let comment = CommentCrud::new(state.db.clone())
        .create(&event_id, &auth.user_id, &user.name, &text)
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn get_comments(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(path): Path<CommentListPath>,
) -> ApiResult<Json<Vec<Comment>>> {
    let comments = CommentCrud::new(state.db.clone())
        .list_for_event(
            &path.event_id,
            path.old_events_timestamp,
            path.new_events_timestamp,
            path.count_comments,
            &auth.user_id,
            state.config.reports_to_quarantine,
        )
        .await?;
    Ok(Json(comments))
}

pub async fn report_comment(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path((event_id, comment_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let outcome = CommentCrud::new(state.db.clone())
        .report(&event_id, &comment_id, &auth.user_id)
        .await?;

    // Quarantine fires exactly once, on the report that reaches the threshold.
    if outcome.reports == state.config.reports_to_quarantine {
        let users = UserCrud::new(state.db.clone());
        let author = users.find_by_id(&outcome.comment.user_id).await?;

        let Some(author) = author else {
            // Orphaned comment, nobody can answer a moderation mail for it.
            CommentCrud::new(state.db.clone()).delete(&comment_id).await?;
            return Ok(StatusCode::OK);
        };

        let code = OneTimeCodeCrud::new(state.db.clone())
            .create(&[CodeAction::Delete, CodeAction::Approve], &comment_id)
            .await?;

        let delete_link = comment_action_url(
            &state.config.server_url,
            CodeAction::Delete,
            &code.id,
            &comment_id,
        );
        let approve_link = comment_action_url(
            &state.config.server_url,
            CodeAction::Approve,
            &code.id,
            &comment_id,
        );
        let body = format!(
            "The comment \"{}\" from {} with email \"{}\" was reported {} times.\n\
             Please follow one of the links underneath to delete or approve the comment.\n\
             Delete: {}\nApprove: {}",
            outcome.comment.comment_text,
            author.name,
            author.email,
            outcome.reports,
            delete_link,
            approve_link,
        );

        let mailer = state.mailer.clone();
        tokio::spawn(async move {
            mailer
                .send_moderation_mail("Comment has been reported", &body)
                .await;
        });
    }

    Ok(StatusCode::OK)
}
