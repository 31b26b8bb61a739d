use chrono::Utc;
use uuid::Uuid;

use super::model::{encode_actions, CodeAction, OneTimeCode, OneTimeCodeRow};
use crate::config::DbPool;
use crate::services::error::ApiResult;

pub struct OneTimeCodeCrud {
    pool: DbPool,
}

impl OneTimeCodeCrud {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        actions: &[CodeAction],
        resource_id: &str,
    ) -> ApiResult<OneTimeCode> {
        let code = OneTimeCode {
            id: Uuid::new_v4().to_string(),
            actions: actions.to_vec(),
            resource_id: resource_id.to_string(),
            created_at: Utc::now().timestamp_millis(),
        };

        sqlx::query(
            "INSERT INTO one_time_codes (id, actions, resource_id, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&code.id)
        .bind(encode_actions(&code.actions))
        .bind(&code.resource_id)
        .bind(code.created_at)
        .execute(&self.pool)
        .await?;

        Ok(code)
    }

    pub async fn find(&self, id: &str) -> ApiResult<Option<OneTimeCode>> {
        let row = sqlx::query_as::<_, OneTimeCodeRow>("SELECT * FROM one_time_codes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(OneTimeCodeRow::into_code))
    }

    /// Deletes the code and reports whether this caller won the row. Exactly
    /// one of any number of concurrent consumers sees `true`; the rest get
    /// post-delete not-found semantics.
    pub async fn consume(&self, id: &str) -> ApiResult<bool> {
        let deleted = sqlx::query("DELETE FROM one_time_codes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }
}
