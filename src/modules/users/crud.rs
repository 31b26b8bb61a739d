use chrono::Utc;
use uuid::Uuid;

use super::model::User;
use crate::config::DbPool;
use crate::services::error::{ApiError, ApiResult};
use crate::services::quota::{self, QuotaDecision};

pub struct UserCrud {
    pool: DbPool,
}

impl UserCrud {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
        auth_method: &str,
    ) -> ApiResult<User> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, password_hash, auth_method)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .bind(auth_method)
        .execute(&self.pool)
        .await?;

        self.find_by_id(&id).await?.ok_or(ApiError::NotFound)
    }

    pub async fn find_by_id(&self, id: &str) -> ApiResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> ApiResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_name(&self, name: &str) -> ApiResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn update_password_hash(&self, user_id: &str, hash: &str) -> ApiResult<()> {
        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn update_push_token(&self, user_id: &str, token: &str) -> ApiResult<()> {
        let updated = sqlx::query("UPDATE users SET push_notification_token = ? WHERE id = ?")
            .bind(token)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if updated == 0 {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }

    pub async fn update_last_location(
        &self,
        user_id: &str,
        longitude: f64,
        latitude: f64,
    ) -> ApiResult<()> {
        sqlx::query(
            "UPDATE users SET last_known_longitude = ?, last_known_latitude = ? WHERE id = ?",
        )
        .bind(longitude)
        .bind(latitude)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn subscribed_categories(&self, user_id: &str) -> ApiResult<Vec<String>> {
        let categories =
            sqlx::query_scalar("SELECT category FROM user_subscriptions WHERE user_id = ?")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(categories)
    }

    pub async fn set_subscribed_categories(
        &self,
        user_id: &str,
        categories: &[String],
    ) -> ApiResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_subscriptions WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for category in categories {
            sqlx::query("INSERT IGNORE INTO user_subscriptions (user_id, category) VALUES (?, ?)")
                .bind(user_id)
                .bind(category)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Push tokens of users subscribed to `category` within `max_meters` of
    /// the given point, excluding the creator and empty tokens.
    pub async fn push_tokens_near(
        &self,
        category: &str,
        longitude: f64,
        latitude: f64,
        max_meters: f64,
        exclude_user: &str,
    ) -> ApiResult<Vec<String>> {
        let tokens = sqlx::query_scalar(
            r#"
            SELECT u.push_notification_token
            FROM users u
            JOIN user_subscriptions s ON s.user_id = u.id
            WHERE s.category = ?
              AND u.id <> ?
              AND u.push_notification_token <> ''
              AND ST_Distance_Sphere(
                    POINT(u.last_known_longitude, u.last_known_latitude),
                    POINT(?, ?)) <= ?
            "#,
        )
        .bind(category)
        .bind(exclude_user)
        .bind(longitude)
        .bind(latitude)
        .bind(max_meters)
        .fetch_all(&self.pool)
        .await?;
        Ok(tokens)
    }

    // =========================================================================
    // DAILY QUOTAS
    // =========================================================================
    //
    // The counter mutations are guarded conditional updates so concurrent
    // creations by the same user cannot slip past the limit, but the quota is
    // consumed before the guarded creation and is not rolled back if the
    // creation fails afterwards.

    pub async fn consume_event_quota(&self, user: &User, limit: i32) -> ApiResult<()> {
        let now = Utc::now().timestamp_millis();
        match quota::evaluate(user.last_event_day, user.event_creations_today, limit, now) {
            QuotaDecision::Denied => Err(ApiError::conflict(
                "Maximum event creations per day reached",
            )),
            QuotaDecision::Increment => {
                let updated = sqlx::query(
                    "UPDATE users SET event_creations_today = event_creations_today + 1
                     WHERE id = ? AND last_event_day = ? AND event_creations_today < ?",
                )
                .bind(&user.id)
                .bind(user.last_event_day)
                .bind(limit)
                .execute(&self.pool)
                .await?
                .rows_affected();
                if updated == 0 {
                    return Err(ApiError::conflict(
                        "Maximum event creations per day reached",
                    ));
                }
                Ok(())
            }
            QuotaDecision::Reset { day } => {
                sqlx::query(
                    "UPDATE users SET last_event_day = ?, event_creations_today = 1 WHERE id = ?",
                )
                .bind(day)
                .bind(&user.id)
                .execute(&self.pool)
                .await?;
                Ok(())
            }
        }
    }

    pub async fn consume_comment_quota(&self, user: &User, limit: i32) -> ApiResult<()> {
        let now = Utc::now().timestamp_millis();
        match quota::evaluate(
            user.last_comment_day,
            user.comment_creations_today,
            limit,
            now,
        ) {
            QuotaDecision::Denied => Err(ApiError::conflict("Maximum comments per day reached")),
            QuotaDecision::Increment => {
                let updated = sqlx::query(
                    "UPDATE users SET comment_creations_today = comment_creations_today + 1
                     WHERE id = ? AND last_comment_day = ? AND comment_creations_today < ?",
                )
                .bind(&user.id)
                .bind(user.last_comment_day)
                .bind(limit)
                .execute(&self.pool)
                .await?
                .rows_affected();
                if updated == 0 {
                    return Err(ApiError::conflict("Maximum comments per day reached"));
                }
                Ok(())
            }
            QuotaDecision::Reset { day } => {
                sqlx::query(
                    "UPDATE users SET last_comment_day = ?, comment_creations_today = 1 WHERE id = ?",
                )
                .bind(day)
                .bind(&user.id)
                .execute(&self.pool)
                .await?;
                Ok(())
            }
        }
    }

    // =========================================================================
    // SESSIONS
    // =========================================================================

    pub async fn create_session(&self, user_id: &str) -> ApiResult<String> {
        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO sessions (id, user_id) VALUES (?, ?)")
            .bind(&id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    pub async fn invalidate_session(&self, session_id: &str) -> ApiResult<()> {
        sqlx::query("UPDATE sessions SET valid = FALSE WHERE id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
