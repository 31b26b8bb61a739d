use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub auth_method: String,
    pub push_notification_token: String,
    pub last_event_day: i64,
    pub event_creations_today: i32,
    pub last_comment_day: i64,
    pub comment_creations_today: i32,
    pub last_known_longitude: f64,
    pub last_known_latitude: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const AUTH_METHOD_EMAIL: &str = "email";
pub const AUTH_METHOD_GOOGLE: &str = "google";

#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub valid: bool,
    pub created_at: DateTime<Utc>,
}
