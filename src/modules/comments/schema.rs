use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, message = "commentText is required"))]
    pub comment_text: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentListPath {
    pub event_id: String,
    pub old_events_timestamp: i64,
    pub new_events_timestamp: i64,
    pub count_comments: i64,
}
