use serde::Serialize;
use sqlx::FromRow;

/// `author` is a denormalized snapshot of the user's name at comment time;
/// the rename transaction fans new names out to it.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub event_id: String,
    pub user_id: String,
    pub author: String,
    pub comment_text: String,
    pub creation_timestamp: i64,
    pub reports: i32,
}
