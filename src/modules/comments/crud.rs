use chrono::Utc;
use uuid::Uuid;

use super::model::Comment;
use crate::config::DbPool;
use crate::services::error::{ApiError, ApiResult};

pub struct CommentCrud {
    pool: DbPool,
}

pub struct CommentReportOutcome {
    pub comment: Comment,
    pub reports: i32,
}

impl CommentCrud {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        event_id: &str,
        user_id: &str,
        author: &str,
        comment_text: &str,
    ) -> ApiResult<Comment> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp_millis();

        sqlx::query(
            r#"
            INSERT INTO comments (id, event_id, user_id, author, comment_text, creation_timestamp)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(event_id)
        .bind(user_id)
        .bind(author)
        .bind(comment_text)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.find_by_id(&id).await?.ok_or(ApiError::NotFound)
    }

    pub async fn find_by_id(&self, id: &str) -> ApiResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(comment)
    }

    /// Comments of an event with creation time strictly outside [old, new],
    /// newest first, caller-specified cap. Quarantined comments and comments
    /// the requester reported are hidden.
    pub async fn list_for_event(
        &self,
        event_id: &str,
        old_events_timestamp: i64,
        new_events_timestamp: i64,
        limit: i64,
        requester_id: &str,
        reports_to_quarantine: i32,
    ) -> ApiResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT c.* FROM comments c
            WHERE c.event_id = ?
              AND (c.creation_timestamp < ? OR c.creation_timestamp > ?)
              AND c.reports <= ?
              AND NOT EXISTS (
                    SELECT 1 FROM comment_reporters r
                    WHERE r.comment_id = c.id AND r.user_id = ?)
            ORDER BY c.creation_timestamp DESC
            LIMIT ?
            "#,
        )
        .bind(event_id)
        .bind(old_events_timestamp)
        .bind(new_events_timestamp)
        .bind(reports_to_quarantine)
        .bind(requester_id)
        .bind(limit.clamp(0, 100))
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    /// One report per user per comment; returns the post-increment count.
    pub async fn report(
        &self,
        event_id: &str,
        comment_id: &str,
        reporter_id: &str,
    ) -> ApiResult<CommentReportOutcome> {
        let comment = self
            .find_by_id(comment_id)
            .await?
            .filter(|c| c.event_id == event_id)
            .ok_or(ApiError::NotFound)?;

        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT IGNORE INTO comment_reporters (comment_id, user_id) VALUES (?, ?)",
        )
        .bind(comment_id)
        .bind(reporter_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 0 {
            return Err(ApiError::conflict("Comment has already been reported"));
        }

        sqlx::query("UPDATE comments SET reports = reports + 1 WHERE id = ?")
            .bind(comment_id)
            .execute(&mut *tx)
            .await?;

        let reports: i32 = sqlx::query_scalar("SELECT reports FROM comments WHERE id = ?")
            .bind(comment_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(CommentReportOutcome { comment, reports })
    }

    /// Moderation approval: clear reports and reporters.
    pub async fn approve(&self, comment_id: &str) -> ApiResult<()> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE comments SET reports = 0 WHERE id = ?")
            .bind(comment_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if updated == 0 {
            return Err(ApiError::NotFound);
        }

        sqlx::query("DELETE FROM comment_reporters WHERE comment_id = ?")
            .bind(comment_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Hard delete; removing an already-removed comment is a no-op.
    pub async fn delete(&self, comment_id: &str) -> ApiResult<()> {
        sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(comment_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
